//! Completeness scoring used to rank duplicate records.

use std::collections::BTreeMap;

use crate::record::{CanonicalRecord, Field};

/// Weighted count of populated optional fields.
///
/// Every optional field weighs 1 unless overridden. The required field is not
/// scored since every record that reaches deduplication has it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletenessScorer {
    weights: BTreeMap<Field, u32>,
}

impl CompletenessScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight(mut self, field: Field, weight: u32) -> Self {
        self.weights.insert(field, weight);
        self
    }

    pub fn weight(&self, field: Field) -> u32 {
        self.weights.get(&field).copied().unwrap_or(1)
    }

    pub fn score(&self, record: &CanonicalRecord) -> u32 {
        record
            .record_type()
            .optional_fields()
            .filter(|field| record.is_present(*field))
            .map(|field| self.weight(field))
            .sum()
    }
}
