//! Stage sequencing for one cleaning run.
//!
//! `RawTable -> [map] -> [normalize + validate] -> [dedup] -> CleanOutcome`
//!
//! Header mapping happens once, before any row is touched, and is the only
//! stage that can fail the run. Every later stage only shrinks the record set
//! and the counts observed between stages become the [`CleaningStats`].
//! A [`Cleaner`] holds no state between runs.

use std::collections::BTreeMap;

use log::{debug, trace};
use serde::Serialize;

use crate::{
    config::CleaningConfig,
    dedup::{Candidate, MostComplete, SurvivorPolicy, deduplicate},
    error::SchemaError,
    mapping::ColumnMapping,
    normalize::{FieldIssue, Normalizer},
    record::{CanonicalRecord, Field, RawTable, RecordType},
    stats::CleaningStats,
    validate::{DropReason, Validator, Verdict},
};

/// Per-run counters that explain the statistics without changing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub drop_reasons: BTreeMap<DropReason, usize>,
    pub field_issues: BTreeMap<Field, usize>,
}

impl Diagnostics {
    fn record_drop(&mut self, reason: DropReason) {
        *self.drop_reasons.entry(reason).or_insert(0) += 1;
    }

    fn record_issues(&mut self, issues: &[FieldIssue]) {
        for issue in issues {
            *self.field_issues.entry(issue.field).or_insert(0) += 1;
        }
    }

    pub fn dropped(&self, reason: DropReason) -> usize {
        self.drop_reasons.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_field_issues(&self) -> usize {
        self.field_issues.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub record_type: RecordType,
    /// Surviving records in original input order.
    pub records: Vec<CanonicalRecord>,
    pub stats: CleaningStats,
    pub diagnostics: Diagnostics,
}

impl CleanOutcome {
    pub fn headers(&self) -> Vec<String> {
        self.record_type
            .fields()
            .iter()
            .map(|field| field.as_str().to_string())
            .collect()
    }
}

pub struct Cleaner<'a> {
    config: &'a CleaningConfig,
    policy: Box<dyn SurvivorPolicy>,
}

impl<'a> Cleaner<'a> {
    pub fn new(config: &'a CleaningConfig) -> Self {
        Self {
            config,
            policy: Box::new(MostComplete::default()),
        }
    }

    pub fn with_policy<P>(self, policy: P) -> Self
    where
        P: SurvivorPolicy + 'static,
    {
        self.with_boxed_policy(Box::new(policy))
    }

    pub fn with_boxed_policy(mut self, policy: Box<dyn SurvivorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn clean(
        &self,
        table: &RawTable,
        record_type: RecordType,
    ) -> Result<CleanOutcome, SchemaError> {
        let original_count = table.len();
        let mapping = ColumnMapping::resolve(
            &table.headers,
            record_type,
            self.config.aliases_for(record_type),
        )?;
        debug!(
            "Mapped {} of {} column(s) for {} records",
            record_type
                .fields()
                .iter()
                .filter(|field| mapping.is_mapped(**field))
                .count(),
            table.headers.len(),
            record_type
        );

        let normalizer = Normalizer::new(self.config);
        let validator = Validator::new(&self.config.email);
        let mut diagnostics = Diagnostics::default();
        let mut valid = Vec::with_capacity(original_count);

        for (position, raw) in table.records.iter().enumerate() {
            let normalized = normalizer.normalize(&mapping, raw);
            for issue in &normalized.issues {
                trace!(
                    "Row {} {}: unusable value {:?}",
                    position + 1,
                    issue.field,
                    issue.raw
                );
            }
            diagnostics.record_issues(&normalized.issues);
            match validator.validate_normalized(&normalized) {
                Verdict::Drop(reason) => {
                    trace!("Row {} dropped: {}", position + 1, reason);
                    diagnostics.record_drop(reason);
                }
                Verdict::Keep => valid.push(Candidate::new(position, normalized.record)),
            }
        }
        let valid_count = valid.len();
        debug!(
            "Validation kept {valid_count} of {original_count} row(s), {} field value(s) unusable",
            diagnostics.total_field_issues()
        );

        let deduped = deduplicate(valid, self.policy.as_ref());
        debug!(
            "Deduplication ({}) merged away {} of {valid_count} row(s)",
            self.policy.name(),
            deduped.duplicates_removed()
        );
        let records: Vec<CanonicalRecord> = deduped
            .survivors
            .into_iter()
            .map(|candidate| candidate.record)
            .collect();

        let stats = CleaningStats::from_stage_counts(original_count, valid_count, records.len());
        Ok(CleanOutcome {
            record_type,
            records,
            stats,
            diagnostics,
        })
    }
}

/// Cleans `table` with the default most-complete survivor policy.
pub fn clean(
    table: &RawTable,
    record_type: RecordType,
    config: &CleaningConfig,
) -> Result<CleanOutcome, SchemaError> {
    Cleaner::new(config).clean(table, record_type)
}
