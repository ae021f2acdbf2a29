//! Typed errors raised by the cleaning engine and its configuration.
//!
//! Only [`SchemaError`] can abort a run. Everything wrong inside a single row
//! is absorbed by normalization or validation and shows up in the statistics.

use thiserror::Error;

use crate::record::{Field, RecordType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("no input column maps to required {record_type} field '{field}'")]
    MissingField {
        field: Field,
        record_type: RecordType,
    },
}

impl SchemaError {
    pub fn missing_field(&self) -> Field {
        match self {
            SchemaError::MissingField { field, .. } => *field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("alias table for {record_type} records lists '{field}', which is not a {record_type} field")]
    ForeignField {
        field: Field,
        record_type: RecordType,
    },
    #[error("alias '{alias}' is claimed by both '{first}' and '{second}' in the {record_type} table")]
    DuplicateAlias {
        alias: String,
        first: Field,
        second: Field,
        record_type: RecordType,
    },
    #[error("employee count ceiling must be greater than zero")]
    ZeroEmployeeCeiling,
}
