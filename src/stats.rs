//! Run statistics derived from the stage counts.
//!
//! [`CleaningStats`] is never mutated field by field. It is always rebuilt from
//! the counts each stage observed, so
//! `original_count == invalid_filtered + duplicates_removed + final_count`
//! holds for every value this module produces.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub original_count: usize,
    pub invalid_filtered: usize,
    pub duplicates_removed: usize,
    pub final_count: usize,
    pub data_retained_pct: f64,
}

impl CleaningStats {
    /// Builds the summary from the number of rows dropped at each stage.
    ///
    /// Drop counts larger than what remains are clamped.
    pub fn from_counts(
        original_count: usize,
        invalid_filtered: usize,
        duplicates_removed: usize,
    ) -> Self {
        let invalid_filtered = invalid_filtered.min(original_count);
        let duplicates_removed = duplicates_removed.min(original_count - invalid_filtered);
        let final_count = original_count - invalid_filtered - duplicates_removed;
        Self {
            original_count,
            invalid_filtered,
            duplicates_removed,
            final_count,
            data_retained_pct: retained_pct(final_count, original_count),
        }
    }

    /// Builds the summary from the number of rows alive after each stage.
    pub fn from_stage_counts(
        original_count: usize,
        valid_count: usize,
        final_count: usize,
    ) -> Self {
        let valid_count = valid_count.min(original_count);
        let final_count = final_count.min(valid_count);
        Self::from_counts(
            original_count,
            original_count - valid_count,
            valid_count - final_count,
        )
    }

    pub fn empty() -> Self {
        Self::from_counts(0, 0, 0)
    }

    pub fn is_consistent(&self) -> bool {
        self.invalid_filtered + self.duplicates_removed + self.final_count == self.original_count
            && (0.0..=100.0).contains(&self.data_retained_pct)
    }
}

/// `100 * kept / total` to one decimal, or 0 when `total` is 0.
///
/// Exact halves round to the even neighbour, so 1 of 16 reports 6.2.
pub fn retained_pct(kept: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = kept as f64 / total as f64 * 100.0;
    (pct * 10.0).round_ties_even() / 10.0
}
