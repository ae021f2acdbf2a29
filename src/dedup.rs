//! Identity-key deduplication.
//!
//! Records are grouped by [`CanonicalRecord::identity_key`] and one survivor
//! is chosen per group. Which record survives is a [`SurvivorPolicy`]; the
//! default keeps the most complete record. Ties always go to the record seen
//! first in input order, whatever the policy. Losers are discarded whole: no
//! fields are merged across duplicates.
//!
//! Records without an identity key are never grouped; each one survives as
//! its own singleton.

use std::{
    cmp::Ordering,
    collections::{HashMap, hash_map::Entry},
    mem,
};

use log::trace;

use crate::{
    record::{CanonicalRecord, IdentityKey},
    score::CompletenessScorer,
};

/// A record tagged with its zero-based position in the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub position: usize,
    pub record: CanonicalRecord,
}

impl Candidate {
    pub fn new(position: usize, record: CanonicalRecord) -> Self {
        Self { position, record }
    }
}

/// Decides between two records that share an identity key.
///
/// `incumbent` always appeared earlier in the input than `challenger`.
/// Returning [`Ordering::Greater`] replaces the incumbent; anything else keeps
/// it.
pub trait SurvivorPolicy: Send + Sync {
    fn compare(&self, challenger: &Candidate, incumbent: &Candidate) -> Ordering;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> SurvivorPolicy for F
where
    F: Fn(&Candidate, &Candidate) -> Ordering + Send + Sync,
{
    fn compare(&self, challenger: &Candidate, incumbent: &Candidate) -> Ordering {
        self(challenger, incumbent)
    }
}

/// Keeps the record with the highest completeness score.
#[derive(Debug, Clone, Default)]
pub struct MostComplete {
    scorer: CompletenessScorer,
}

impl MostComplete {
    pub fn new(scorer: CompletenessScorer) -> Self {
        Self { scorer }
    }
}

impl SurvivorPolicy for MostComplete {
    fn compare(&self, challenger: &Candidate, incumbent: &Candidate) -> Ordering {
        self.scorer
            .score(&challenger.record)
            .cmp(&self.scorer.score(&incumbent.record))
    }

    fn name(&self) -> &str {
        "most-complete"
    }
}

/// Keeps the last row for each key, for exports that append newer rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestRow;

impl SurvivorPolicy for LatestRow {
    fn compare(&self, challenger: &Candidate, incumbent: &Candidate) -> Ordering {
        challenger.position.cmp(&incumbent.position)
    }

    fn name(&self) -> &str {
        "latest"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    /// One record per identity key plus every keyless record, in input order.
    pub survivors: Vec<Candidate>,
    /// Superseded records, in input order.
    pub duplicates: Vec<Candidate>,
}

impl DedupOutcome {
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates.len()
    }
}

pub fn deduplicate<P>(mut candidates: Vec<Candidate>, policy: &P) -> DedupOutcome
where
    P: SurvivorPolicy + ?Sized,
{
    candidates.sort_by_key(|candidate| candidate.position);

    let mut survivors: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut slots: HashMap<IdentityKey, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for candidate in candidates {
        let Some(key) = candidate.record.identity_key() else {
            survivors.push(candidate);
            continue;
        };
        match slots.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(survivors.len());
                survivors.push(candidate);
            }
            Entry::Occupied(entry) => {
                let incumbent = &mut survivors[*entry.get()];
                let loser = if policy.compare(&candidate, incumbent) == Ordering::Greater {
                    mem::replace(incumbent, candidate)
                } else {
                    candidate
                };
                trace!(
                    "Row {} superseded under key {} ({})",
                    loser.position + 1,
                    entry.key(),
                    policy.name()
                );
                duplicates.push(loser);
            }
        }
    }

    survivors.sort_by_key(|candidate| candidate.position);
    duplicates.sort_by_key(|candidate| candidate.position);
    DedupOutcome {
        survivors,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Account, Contact};

    fn contact(position: usize, email: &str, title: Option<&str>) -> Candidate {
        Candidate::new(
            position,
            CanonicalRecord::Contact(Contact {
                email: Some(email.to_string()),
                title: title.map(str::to_string),
                ..Contact::default()
            }),
        )
    }

    #[test]
    fn survivor_keeps_its_own_position_in_output() {
        let input = vec![
            contact(0, "a@acme.com", None),
            contact(1, "b@acme.com", None),
            contact(2, "a@acme.com", Some("CEO")),
        ];
        let outcome = deduplicate(input, &MostComplete::default());
        let positions: Vec<usize> = outcome.survivors.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(outcome.duplicates[0].position, 0);
    }

    #[test]
    fn keyless_accounts_are_never_merged() {
        let keyless = |position| {
            Candidate::new(position, CanonicalRecord::Account(Account::default()))
        };
        let outcome = deduplicate(vec![keyless(0), keyless(1)], &MostComplete::default());
        assert_eq!(outcome.survivors.len(), 2);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn latest_row_policy_keeps_last_occurrence() {
        let input = vec![
            contact(0, "a@acme.com", Some("CEO")),
            contact(1, "a@acme.com", None),
        ];
        let outcome = deduplicate(input, &LatestRow);
        assert_eq!(outcome.survivors[0].position, 1);
    }

    #[test]
    fn closure_policy_is_accepted() {
        let never_replace = |_: &Candidate, _: &Candidate| Ordering::Less;
        let input = vec![
            contact(0, "a@acme.com", None),
            contact(1, "a@acme.com", Some("CEO")),
        ];
        let outcome = deduplicate(input, &never_replace);
        assert_eq!(outcome.survivors[0].position, 0);
    }
}
