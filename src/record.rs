//! Record shapes flowing through the cleaning engine.
//!
//! A [`RawTable`] holds rows exactly as the input reader produced them. After
//! header mapping and normalization every row becomes a [`CanonicalRecord`],
//! which is one of two fixed shapes: [`Contact`] or [`Account`]. Every
//! canonical field is always present on the struct; absence is `None`.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Contact,
    Account,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Contact => "contact",
            RecordType::Account => "account",
        }
    }

    /// Canonical fields in output column order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            RecordType::Contact => CONTACT_FIELDS,
            RecordType::Account => ACCOUNT_FIELDS,
        }
    }

    /// The single field whose absence drops a record.
    pub fn required_field(&self) -> Field {
        match self {
            RecordType::Contact => Field::Email,
            RecordType::Account => Field::Name,
        }
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = Field> + '_ {
        let required = self.required_field();
        self.fields().iter().copied().filter(move |f| *f != required)
    }

    pub fn owns(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CONTACT_FIELDS: &[Field] = &[
    Field::FullName,
    Field::Email,
    Field::Title,
    Field::Phone,
    Field::LinkedinUrl,
    Field::Country,
    Field::Domain,
];

const ACCOUNT_FIELDS: &[Field] = &[
    Field::Name,
    Field::Website,
    Field::Domain,
    Field::Industry,
    Field::EmployeeCount,
    Field::BillingCountry,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Email,
    Title,
    Phone,
    LinkedinUrl,
    Country,
    Domain,
    Name,
    Website,
    Industry,
    EmployeeCount,
    BillingCountry,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::Title => "title",
            Field::Phone => "phone",
            Field::LinkedinUrl => "linkedin_url",
            Field::Country => "country",
            Field::Domain => "domain",
            Field::Name => "name",
            Field::Website => "website",
            Field::Industry => "industry",
            Field::EmployeeCount => "employee_count",
            Field::BillingCountry => "billing_country",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row, cells aligned with [`RawTable::headers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub cells: Vec<String>,
}

impl RawRecord {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the cell at `index`, treating short rows as empty.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Rows in original input order with their verbatim headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records.push(RawRecord::new(cells));
    }

    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(cells);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn as_display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub country: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: Option<String>,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub billing_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Contact(Contact),
    Account(Account),
}

impl CanonicalRecord {
    pub fn record_type(&self) -> RecordType {
        match self {
            CanonicalRecord::Contact(_) => RecordType::Contact,
            CanonicalRecord::Account(_) => RecordType::Account,
        }
    }

    pub fn get(&self, field: Field) -> Option<FieldValue> {
        let text = |value: &Option<String>| value.clone().map(FieldValue::Text);
        match self {
            CanonicalRecord::Contact(c) => match field {
                Field::FullName => text(&c.full_name),
                Field::Email => text(&c.email),
                Field::Title => text(&c.title),
                Field::Phone => text(&c.phone),
                Field::LinkedinUrl => text(&c.linkedin_url),
                Field::Country => text(&c.country),
                Field::Domain => text(&c.domain),
                _ => None,
            },
            CanonicalRecord::Account(a) => match field {
                Field::Name => text(&a.name),
                Field::Website => text(&a.website),
                Field::Domain => text(&a.domain),
                Field::Industry => text(&a.industry),
                Field::EmployeeCount => a.employee_count.map(FieldValue::Integer),
                Field::BillingCountry => text(&a.billing_country),
                _ => None,
            },
        }
    }

    pub fn is_present(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Field values in the record type's output column order.
    pub fn values(&self) -> Vec<(Field, Option<FieldValue>)> {
        self.record_type()
            .fields()
            .iter()
            .map(|field| (*field, self.get(*field)))
            .collect()
    }

    /// Renders the record as CSV cells; `None` becomes an empty cell.
    pub fn to_row(&self) -> Vec<String> {
        self.values()
            .into_iter()
            .map(|(_, value)| value.map(|v| v.as_display()).unwrap_or_default())
            .collect()
    }

    /// Identity under which duplicates collapse.
    ///
    /// Contacts key on their lowercased email. Accounts key on their domain,
    /// falling back to the lowercased name. Domain and name keys live in
    /// separate namespaces so an account named "acme.com" never collides with
    /// an account whose domain is `acme.com`.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        match self {
            CanonicalRecord::Contact(c) => non_blank(c.email.as_deref())
                .map(|email| IdentityKey::Email(email.to_lowercase())),
            CanonicalRecord::Account(a) => {
                if let Some(domain) = non_blank(a.domain.as_deref()) {
                    Some(IdentityKey::Domain(domain.to_lowercase()))
                } else {
                    non_blank(a.name.as_deref()).map(|name| {
                        IdentityKey::Name(name.split_whitespace().join(" ").to_lowercase())
                    })
                }
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Email(String),
    Domain(String),
    Name(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Email(v) => write!(f, "email:{v}"),
            IdentityKey::Domain(v) => write!(f, "domain:{v}"),
            IdentityKey::Name(v) => write!(f, "name:{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_prefers_domain_then_name() {
        let with_domain = CanonicalRecord::Account(Account {
            name: Some("Acme Corp".into()),
            domain: Some("acme-corp.com".into()),
            ..Account::default()
        });
        assert_eq!(
            with_domain.identity_key(),
            Some(IdentityKey::Domain("acme-corp.com".into()))
        );

        let name_only = CanonicalRecord::Account(Account {
            name: Some("Acme   CORP".into()),
            ..Account::default()
        });
        assert_eq!(
            name_only.identity_key(),
            Some(IdentityKey::Name("acme corp".into()))
        );
    }

    #[test]
    fn blank_email_has_no_key() {
        let contact = CanonicalRecord::Contact(Contact {
            email: Some("  ".into()),
            ..Contact::default()
        });
        assert_eq!(contact.identity_key(), None);
    }

    #[test]
    fn to_row_follows_field_order() {
        let account = CanonicalRecord::Account(Account {
            name: Some("Acme".into()),
            employee_count: Some(250),
            ..Account::default()
        });
        assert_eq!(account.to_row(), vec!["Acme", "", "", "", "250", ""]);
    }
}
