//! Per-record eligibility rules.
//!
//! Rules run in a fixed order and the first failing rule names the drop
//! reason. Field issues raised during normalization (a corrupt headcount, a
//! phone with no digits) never drop a record on their own; only the required
//! field rules are fatal.

use std::fmt;

use serde::Serialize;

use crate::{
    config::EmailRules,
    normalize::{EmailClass, Normalized, classify_email},
    record::{CanonicalRecord, Field},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingEmail,
    MalformedEmail,
    GenericEmail,
    BlockedEmailDomain,
    MissingName,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::MissingEmail => "missing email",
            DropReason::MalformedEmail => "malformed email",
            DropReason::GenericEmail => "generic role email",
            DropReason::BlockedEmailDomain => "test or disposable email domain",
            DropReason::MissingName => "missing name",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop(DropReason),
}

impl Verdict {
    fn from_failure(reason: Option<DropReason>) -> Self {
        reason.map_or(Verdict::Keep, Verdict::Drop)
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Verdict::Keep)
    }

    pub fn reason(&self) -> Option<DropReason> {
        match self {
            Verdict::Keep => None,
            Verdict::Drop(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    rules: &'a EmailRules,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a EmailRules) -> Self {
        Self { rules }
    }

    pub fn validate(&self, record: &CanonicalRecord) -> Verdict {
        Verdict::from_failure(self.first_failure(record))
    }

    /// Like [`Validator::validate`], but uses the normalization issues to tell
    /// a malformed address apart from an absent one.
    pub fn validate_normalized(&self, normalized: &Normalized) -> Verdict {
        let reason = match self.first_failure(&normalized.record) {
            Some(DropReason::MissingEmail)
                if normalized.issues.iter().any(|i| i.field == Field::Email) =>
            {
                Some(DropReason::MalformedEmail)
            }
            other => other,
        };
        Verdict::from_failure(reason)
    }

    fn first_failure(&self, record: &CanonicalRecord) -> Option<DropReason> {
        match record {
            CanonicalRecord::Contact(contact) => {
                let Some(email) = contact.email.as_deref() else {
                    return Some(DropReason::MissingEmail);
                };
                match classify_email(email, self.rules) {
                    EmailClass::Usable => None,
                    EmailClass::Malformed => Some(DropReason::MalformedEmail),
                    EmailClass::GenericRole => Some(DropReason::GenericEmail),
                    EmailClass::BlockedDomain => Some(DropReason::BlockedEmailDomain),
                }
            }
            CanonicalRecord::Account(account) => {
                let missing = account
                    .name
                    .as_deref()
                    .is_none_or(|name| name.trim().is_empty());
                missing.then_some(DropReason::MissingName)
            }
        }
    }
}
