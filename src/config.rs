//! Run configuration for the cleaning engine.
//!
//! [`CleaningConfig`] bundles the column alias tables, the email
//! classification lists, the country alias map, placeholder tokens, and numeric
//! sanity limits. It is an ordinary immutable value: callers build or load one
//! and pass it by reference into [`crate::pipeline::Cleaner`], so two runs with
//! different configurations can execute side by side.
//!
//! Configuration files are YAML. Sections left out of a file keep their
//! compiled-in defaults; sections that are present replace the default whole.

use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    mapping::normalize_header,
    record::{Field, RecordType},
};

pub const DEFAULT_EMPLOYEE_COUNT_CEILING: i64 = 10_000_000;

const DEFAULT_GENERIC_LOCAL_PARTS: &[&str] = &[
    "info",
    "admin",
    "support",
    "noreply",
    "no-reply",
    "webmaster",
    "postmaster",
    "hostmaster",
    "test",
    "example",
];

const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "test.com",
    "localhost",
    "mailinator.com",
];

const DEFAULT_PLACEHOLDERS: &[&str] = &["n/a", "na", "null", "none", "-"];

const DEFAULT_PROFILE_HOSTS: &[&str] = &["linkedin.com"];

const DEFAULT_COUNTRIES: &[(&str, &str)] = &[
    ("usa", "United States"),
    ("us", "United States"),
    ("u.s.", "United States"),
    ("u.s.a.", "United States"),
    ("united states", "United States"),
    ("united states of america", "United States"),
    ("america", "United States"),
    ("uk", "United Kingdom"),
    ("gb", "United Kingdom"),
    ("u.k.", "United Kingdom"),
    ("great britain", "United Kingdom"),
    ("united kingdom", "United Kingdom"),
    ("england", "United Kingdom"),
    ("de", "Germany"),
    ("deutschland", "Germany"),
    ("fr", "France"),
    ("ca", "Canada"),
    ("au", "Australia"),
    ("uae", "United Arab Emirates"),
];

const DEFAULT_CONTACT_ALIASES: &[(Field, &[&str])] = &[
    (Field::FullName, &["full name", "name", "contact name"]),
    (Field::Email, &["email address", "e-mail", "contact email", "mail"]),
    (Field::Title, &["job title", "position", "role"]),
    (Field::Phone, &["phone number", "telephone", "mobile", "tel"]),
    (Field::LinkedinUrl, &["linkedin", "linkedin url", "linkedin profile"]),
    (Field::Country, &["country/region", "location", "region"]),
    (Field::Domain, &["company domain", "email domain"]),
];

const DEFAULT_ACCOUNT_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Name,
        &["company name", "company", "account name", "organization", "organisation"],
    ),
    (Field::Website, &["web site", "url", "company website", "homepage"]),
    (Field::Domain, &["company domain", "website domain"]),
    (Field::Industry, &["sector", "vertical", "business type"]),
    (
        Field::EmployeeCount,
        &["employee count", "employees", "company size", "headcount"],
    ),
    (
        Field::BillingCountry,
        &["country", "billing country", "country/region", "location"],
    ),
];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub aliases: AliasTables,
    pub email: EmailRules,
    pub countries: CountryTable,
    pub placeholders: Vec<String>,
    pub profile_hosts: Vec<String>,
    pub employee_count_ceiling: i64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            aliases: AliasTables::default(),
            email: EmailRules::default(),
            countries: CountryTable::default(),
            placeholders: owned(DEFAULT_PLACEHOLDERS),
            profile_hosts: owned(DEFAULT_PROFILE_HOSTS),
            employee_count_ceiling: DEFAULT_EMPLOYEE_COUNT_CEILING,
        }
    }
}

impl CleaningConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: CleaningConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config
            .validate()
            .with_context(|| format!("Validating config file {path:?}"))?;
        Ok(config)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: CleaningConfig = serde_yaml::from_str(input).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing config YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing config to YAML string")
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.employee_count_ceiling <= 0 {
            return Err(ConfigError::ZeroEmployeeCeiling);
        }
        self.aliases.contact.validate(RecordType::Contact)?;
        self.aliases.account.validate(RecordType::Account)?;
        Ok(())
    }

    pub fn is_placeholder(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.placeholders
            .iter()
            .any(|token| token.trim().eq_ignore_ascii_case(trimmed))
    }

    pub fn aliases_for(&self, record_type: RecordType) -> &AliasTable {
        match record_type {
            RecordType::Contact => &self.aliases.contact,
            RecordType::Account => &self.aliases.account,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTables {
    pub contact: AliasTable,
    pub account: AliasTable,
}

impl Default for AliasTables {
    fn default() -> Self {
        Self {
            contact: AliasTable::from_static(DEFAULT_CONTACT_ALIASES),
            account: AliasTable::from_static(DEFAULT_ACCOUNT_ALIASES),
        }
    }
}

/// Canonical field to accepted input header spellings.
///
/// A field's own name is always accepted, whether or not it is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(BTreeMap<Field, Vec<String>>);

impl AliasTable {
    fn from_static(entries: &[(Field, &[&str])]) -> Self {
        Self(
            entries
                .iter()
                .map(|(field, aliases)| (*field, owned(aliases)))
                .collect(),
        )
    }

    pub fn with_alias(mut self, field: Field, alias: impl Into<String>) -> Self {
        self.0.entry(field).or_default().push(alias.into());
        self
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Normalized header spellings for `field`, its own name first.
    pub fn candidates(&self, field: Field) -> Vec<String> {
        let mut out = vec![normalize_header(field.as_str())];
        for alias in self.aliases(field) {
            let normalized = normalize_header(alias);
            if !normalized.is_empty() && !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        out
    }

    pub fn validate(&self, record_type: RecordType) -> std::result::Result<(), ConfigError> {
        if let Some(field) = self.0.keys().find(|field| !record_type.owns(**field)) {
            return Err(ConfigError::ForeignField {
                field: *field,
                record_type,
            });
        }
        let mut owners: HashMap<String, Field> = HashMap::new();
        for field in record_type.fields() {
            for candidate in self.candidates(*field) {
                match owners.get(&candidate) {
                    Some(first) if first != field => {
                        return Err(ConfigError::DuplicateAlias {
                            alias: candidate,
                            first: *first,
                            second: *field,
                            record_type,
                        });
                    }
                    _ => {
                        owners.insert(candidate, *field);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Lists that mark syntactically valid addresses as unusable for outreach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRules {
    pub generic_local_parts: Vec<String>,
    pub blocked_domains: Vec<String>,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self {
            generic_local_parts: owned(DEFAULT_GENERIC_LOCAL_PARTS),
            blocked_domains: owned(DEFAULT_BLOCKED_DOMAINS),
        }
    }
}

impl EmailRules {
    pub fn is_generic_local_part(&self, local: &str) -> bool {
        self.generic_local_parts
            .iter()
            .any(|entry| entry.trim().eq_ignore_ascii_case(local))
    }

    /// Matches the domain itself or any subdomain of it.
    pub fn is_blocked_domain(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        self.blocked_domains.iter().any(|entry| {
            let entry = entry.trim().to_ascii_lowercase();
            !entry.is_empty()
                && (domain == entry
                    || domain
                        .strip_suffix(entry.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.')))
        })
    }
}

/// Case-insensitive country alias map. Keys are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct CountryTable(BTreeMap<String, String>);

impl Default for CountryTable {
    fn default() -> Self {
        DEFAULT_COUNTRIES
            .iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}

impl From<BTreeMap<String, String>> for CountryTable {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(alias, name)| (country_key(&alias), name.trim().to_string()))
                .filter(|(alias, name)| !alias.is_empty() && !name.is_empty())
                .collect(),
        )
    }
}

impl From<CountryTable> for BTreeMap<String, String> {
    fn from(table: CountryTable) -> Self {
        table.0
    }
}

impl CountryTable {
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.0.get(&country_key(raw)).map(String::as_str)
    }
}

fn country_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
