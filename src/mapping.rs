//! Header to canonical field mapping.
//!
//! Input headers and configured aliases are compared after the same
//! normalization: BOM stripped, trimmed, lowercased, and converted to
//! `snake_case`, so `" E-Mail Address"` and `email_address` are the same name.
//! Columns that match no canonical field are left unmapped and never reach the
//! cleaned output.

use std::collections::BTreeMap;

use heck::ToSnakeCase;
use log::debug;

use crate::{
    config::AliasTable,
    error::SchemaError,
    record::{Field, RawRecord, RecordType},
};

pub fn normalize_header(name: &str) -> String {
    let trimmed = name.trim_start_matches('\u{feff}').trim();
    trimmed.to_lowercase().to_snake_case()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    record_type: RecordType,
    headers: Vec<String>,
    assignments: BTreeMap<Field, usize>,
}

impl ColumnMapping {
    /// Resolves every canonical field of `record_type` against `headers`.
    ///
    /// For each field, in output order, the first candidate spelling that
    /// matches a still unclaimed column wins. Fails when the record type's
    /// required field finds no column at all.
    pub fn resolve(
        headers: &[String],
        record_type: RecordType,
        aliases: &AliasTable,
    ) -> Result<Self, SchemaError> {
        let mapping = Self::resolve_lenient(headers, record_type, aliases);
        mapping.ensure_required()?;
        let unmapped = mapping.unmapped_headers();
        if !unmapped.is_empty() {
            debug!("Dropping unmapped column(s): {:?}", unmapped);
        }
        Ok(mapping)
    }

    /// Same matching as [`ColumnMapping::resolve`] without the required field check.
    pub fn resolve_lenient(
        headers: &[String],
        record_type: RecordType,
        aliases: &AliasTable,
    ) -> Self {
        let normalized = headers
            .iter()
            .map(|header| normalize_header(header))
            .collect::<Vec<_>>();
        let mut claimed = vec![false; headers.len()];
        let mut assignments = BTreeMap::new();

        for field in record_type.fields() {
            let found = aliases.candidates(*field).into_iter().find_map(|candidate| {
                normalized
                    .iter()
                    .enumerate()
                    .find(|(idx, name)| !claimed[*idx] && **name == candidate)
                    .map(|(idx, _)| idx)
            });
            if let Some(idx) = found {
                claimed[idx] = true;
                assignments.insert(*field, idx);
                debug!("Column '{}' -> {}", headers[idx], field);
            }
        }

        Self {
            record_type,
            headers: headers.to_vec(),
            assignments,
        }
    }

    pub fn ensure_required(&self) -> Result<(), SchemaError> {
        let required = self.record_type.required_field();
        if self.assignments.contains_key(&required) {
            Ok(())
        } else {
            Err(SchemaError::MissingField {
                field: required,
                record_type: self.record_type,
            })
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn column_index(&self, field: Field) -> Option<usize> {
        self.assignments.get(&field).copied()
    }

    /// Original header text mapped onto `field`.
    pub fn source_header(&self, field: Field) -> Option<&str> {
        self.column_index(field)
            .and_then(|idx| self.headers.get(idx))
            .map(String::as_str)
    }

    /// Raw cell for `field`, or `None` when no column maps to it.
    pub fn value<'r>(&self, raw: &'r RawRecord, field: Field) -> Option<&'r str> {
        self.column_index(field).map(|idx| raw.cell(idx))
    }

    pub fn is_mapped(&self, field: Field) -> bool {
        self.assignments.contains_key(&field)
    }

    pub fn unmapped_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.assignments.values().any(|claimed| claimed == idx))
            .map(|(_, header)| header.as_str())
            .collect()
    }
}
