//! Field normalizers.
//!
//! Each free function maps one raw cell to its canonical form or `None`. None
//! of them fail: malformed input degrades to `None` or to a best-effort value.
//! [`Normalizer`] applies them to a mapped row, strips configured placeholder
//! tokens first, and records a [`FieldIssue`] whenever a non-empty source cell
//! could not be salvaged.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::{
    config::{CleaningConfig, CountryTable, EmailRules},
    mapping::ColumnMapping,
    record::{Account, CanonicalRecord, Contact, Field, RawRecord, RecordType},
};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email shape pattern is valid")
});

static HEADCOUNT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}(,\d{3})+|\d+)(\.0+)?$").expect("headcount pattern is valid")
});

/// Collapses runs of whitespace to a single space and trims both ends.
pub fn collapse_whitespace(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim();
    let needs_rewrite = trimmed
        .as_bytes()
        .windows(2)
        .any(|pair| pair[0].is_ascii_whitespace() && pair[1].is_ascii_whitespace())
        || trimmed.chars().any(|ch| ch.is_whitespace() && ch != ' ');
    if needs_rewrite {
        Cow::Owned(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        Cow::Borrowed(trimmed)
    }
}

pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Uppercases every letter that follows a non-letter and lowercases the rest,
/// so `"côte d'ivoire"` becomes `"Côte D'Ivoire"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

/// Lowercased address, or `None` when it is not shaped like `local@domain.tld`
/// with a well-formed host after the last `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("mailto:")
        .or_else(|| trimmed.strip_prefix("MAILTO:"))
        .unwrap_or(trimmed);
    let lowered = trimmed.to_lowercase();
    if !EMAIL_SHAPE.is_match(&lowered) {
        return None;
    }
    let (_, host) = lowered.rsplit_once('@')?;
    is_host_like(host).then_some(lowered)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailClass {
    Usable,
    Malformed,
    GenericRole,
    BlockedDomain,
}

pub fn classify_email(raw: &str, rules: &EmailRules) -> EmailClass {
    let Some(email) = normalize_email(raw) else {
        return EmailClass::Malformed;
    };
    let Some((local, domain)) = email.rsplit_once('@') else {
        return EmailClass::Malformed;
    };
    if rules.is_generic_local_part(local) {
        EmailClass::GenericRole
    } else if rules.is_blocked_domain(domain) {
        EmailClass::BlockedDomain
    } else {
        EmailClass::Usable
    }
}

/// True for syntactically valid addresses that are fit for outreach.
pub fn is_valid_email(raw: &str, rules: &EmailRules) -> bool {
    classify_email(raw, rules) == EmailClass::Usable
}

fn strip_scheme(value: &str) -> &str {
    if let Some(idx) = value.find("://") {
        &value[idx + 3..]
    } else if let Some(rest) = value.strip_prefix("//") {
        rest
    } else if let Some(rest) = value.strip_prefix("mailto:") {
        rest
    } else {
        value
    }
}

fn strip_www(mut host: &str) -> &str {
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    host
}

fn is_host_like(host: &str) -> bool {
    let mut labels = 0usize;
    for label in host.split('.') {
        if label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|ch| ch.is_alphanumeric() || ch == '-')
        {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}

/// Bare lowercase host from a URL, an email address, or a bare domain.
///
/// `extract_domain("https://www.acme-corp.com/about")` is `acme-corp.com`, and
/// feeding that result back in returns it unchanged.
pub fn extract_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let rest = strip_scheme(&lowered);
    let rest = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let rest = rest.rsplit_once('@').map(|(_, host)| host).unwrap_or(rest);
    let rest = match rest.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|ch| ch.is_ascii_digit()) => host,
        _ => rest,
    };
    let host = strip_www(rest.trim_end_matches('.'));
    is_host_like(host).then(|| host.to_string())
}

/// Trimmed, lowercased website; `None` when empty.
pub fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Canonical country name from the alias table, otherwise the input title-cased.
pub fn normalize_country(raw: &str, table: &CountryTable) -> Option<String> {
    let collapsed = normalize_text(raw)?;
    Some(
        table
            .lookup(&collapsed)
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&collapsed)),
    )
}

/// Digits only, keeping a leading `+` when the source had one.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

/// `https://` URL on the canonical host with no `www.`, query, or trailing slash.
///
/// When `allowed_hosts` is non-empty the host must be one of them or a
/// subdomain of one (`uk.linkedin.com` collapses to `linkedin.com`).
pub fn normalize_profile_url(raw: &str, allowed_hosts: &[String]) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let rest = strip_scheme(&lowered);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let rest = rest.trim_end_matches('/');
    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let host = strip_www(host);
    if !is_host_like(host) {
        return None;
    }
    let host = if allowed_hosts.is_empty() {
        host.to_string()
    } else {
        allowed_hosts
            .iter()
            .map(|allowed| allowed.trim().to_lowercase())
            .find(|allowed| {
                host == allowed.as_str()
                    || host
                        .strip_suffix(allowed.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })?
    };
    let path = path.trim_end_matches('/');
    Some(format!("https://{host}{path}"))
}

/// Whole, non-negative headcount no larger than `ceiling`.
///
/// Accepts plain digits or comma groups of three (`"1,200"`), optionally
/// followed by a zero fraction such as `"1200.0"`. Ranges, signs and exponents
/// are rejected.
pub fn normalize_employee_count(raw: &str, ceiling: i64) -> Option<i64> {
    let captures = HEADCOUNT_SHAPE.captures(raw.trim())?;
    let whole = captures.get(1)?.as_str().replace(',', "");
    let parsed: i64 = whole.parse().ok()?;
    (parsed <= ceiling).then_some(parsed)
}

/// A non-empty source cell that normalized to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: CanonicalRecord,
    pub issues: Vec<FieldIssue>,
}

/// Turns mapped raw rows into canonical records under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    config: &'a CleaningConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a CleaningConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, mapping: &ColumnMapping, raw: &RawRecord) -> Normalized {
        let mut row = RowNormalizer {
            normalizer: self,
            mapping,
            raw,
            issues: Vec::new(),
        };
        let record = match mapping.record_type() {
            RecordType::Contact => CanonicalRecord::Contact(row.contact()),
            RecordType::Account => CanonicalRecord::Account(row.account()),
        };
        Normalized {
            record,
            issues: row.issues,
        }
    }

    fn apply(&self, field: Field, value: &str) -> Option<String> {
        let config = self.config;
        match field {
            Field::FullName | Field::Title | Field::Name => normalize_text(value),
            Field::Industry => normalize_text(value).map(|text| title_case(&text)),
            Field::Email => normalize_email(value),
            Field::Phone => normalize_phone(value),
            Field::LinkedinUrl => normalize_profile_url(value, &config.profile_hosts),
            Field::Country | Field::BillingCountry => normalize_country(value, &config.countries),
            Field::Domain => extract_domain(value),
            Field::Website => normalize_website(value),
            // Numeric; normalized by `RowNormalizer::account`.
            Field::EmployeeCount => None,
        }
    }
}

struct RowNormalizer<'n, 'a> {
    normalizer: &'n Normalizer<'a>,
    mapping: &'n ColumnMapping,
    raw: &'n RawRecord,
    issues: Vec<FieldIssue>,
}

impl<'n> RowNormalizer<'n, '_> {
    /// Source cell for `field`, with blanks and placeholders already removed.
    fn source(&self, field: Field) -> Option<&'n str> {
        let raw: &'n RawRecord = self.raw;
        let value = self.mapping.value(raw, field)?.trim();
        if value.is_empty() || self.normalizer.config.is_placeholder(value) {
            None
        } else {
            Some(value)
        }
    }

    fn field(&mut self, field: Field) -> Option<String> {
        let normalizer = self.normalizer;
        self.field_with(field, |value| normalizer.apply(field, value))
    }

    /// Runs `normalize` on the source cell, recording an issue when it yields nothing.
    fn field_with<T>(
        &mut self,
        field: Field,
        normalize: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let source = self.source(field)?;
        let normalized = normalize(source);
        if normalized.is_none() {
            self.issues.push(FieldIssue {
                field,
                raw: source.to_string(),
            });
        }
        normalized
    }

    fn contact(&mut self) -> Contact {
        let email = self.field(Field::Email);
        let domain = self.field(Field::Domain).or_else(|| {
            email
                .as_deref()
                .and_then(|address| address.rsplit_once('@'))
                .and_then(|(_, host)| extract_domain(host))
        });
        Contact {
            full_name: self.field(Field::FullName),
            email,
            title: self.field(Field::Title),
            phone: self.field(Field::Phone),
            linkedin_url: self.field(Field::LinkedinUrl),
            country: self.field(Field::Country),
            domain,
        }
    }

    fn account(&mut self) -> Account {
        let ceiling = self.normalizer.config.employee_count_ceiling;
        let website = self.field(Field::Website);
        let domain = self
            .field(Field::Domain)
            .or_else(|| website.as_deref().and_then(extract_domain));
        Account {
            name: self.field(Field::Name),
            website,
            domain,
            industry: self.field(Field::Industry),
            employee_count: self.field_with(Field::EmployeeCount, |value| {
                normalize_employee_count(value, ceiling)
            }),
            billing_country: self.field(Field::BillingCountry),
        }
    }
}
