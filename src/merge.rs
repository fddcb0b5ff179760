//! Cross-source merge engine.

use ahash::AHashMap;
use chrono::{DateTime, Utc};

use crate::category::Category;
use crate::rule::StoredRule;
use crate::store::RuleStore;
use crate::Result;

/// What the merge engine did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First sighting of the fingerprint
    Inserted,
    /// Custom rule replaced the existing record
    Overwritten,
    /// Existing record updated; `variant_added` is false when the exact text was already known
    Merged { variant_added: bool },
}

/// Merge a candidate record into the existing record for its fingerprint.
///
/// - custom candidates replace the existing record, prior variants included
/// - without an existing record the candidate is inserted as-is
/// - otherwise sources and tags are unioned, `lastUpdated` is refreshed and
///   the candidate's variant is appended unless its text is already present
pub fn merge(
    candidate: StoredRule,
    existing: Option<StoredRule>,
    now: DateTime<Utc>,
) -> (StoredRule, MergeOutcome) {
    if candidate.category() == Category::Custom {
        return (candidate, MergeOutcome::Overwritten);
    }

    let Some(mut record) = existing else {
        return (candidate, MergeOutcome::Inserted);
    };

    let StoredRule {
        raw,
        metadata,
        variants,
        ..
    } = candidate;

    record.metadata.sources.extend(metadata.sources);
    record.metadata.tags.extend(metadata.tags);
    record.metadata.last_updated = now;

    let variant_added = if record.has_variant(&raw) {
        false
    } else {
        record.variants.extend(variants.into_iter().take(1));
        true
    };

    (record, MergeOutcome::Merged { variant_added })
}

/// Counters for one batch of merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub inserted: usize,
    pub overwritten: usize,
    pub merged: usize,
    pub variants_added: usize,
}

impl MergeCounts {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted += 1,
            MergeOutcome::Overwritten => self.overwritten += 1,
            MergeOutcome::Merged { variant_added } => {
                self.merged += 1;
                if variant_added {
                    self.variants_added += 1;
                }
            }
        }
    }
}

/// In-memory accumulation of merged records for one source.
///
/// Records are looked up in the batch first and in the store second, so a
/// rule repeated inside one source merges with its own earlier sighting
/// exactly as it would with per-rule writes. [`MergeBatch::flush`] issues a
/// single bulk upsert.
#[derive(Debug, Default)]
pub struct MergeBatch {
    records: Vec<StoredRule>,
    by_hash: AHashMap<String, usize>,
    counts: MergeCounts,
}

impl MergeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a candidate against the batch, falling back to the store.
    pub fn merge<S: RuleStore + ?Sized>(
        &mut self,
        store: &S,
        candidate: StoredRule,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome> {
        let pending = self.by_hash.get(&candidate.hash).copied();
        let existing = match pending {
            Some(idx) => Some(self.records[idx].clone()),
            None => store.find_by_raw(&candidate.raw)?,
        };

        let (record, outcome) = merge(candidate, existing, now);
        log::debug!("{:?}: {}", outcome, record.raw);
        self.counts.record(outcome);

        match pending {
            Some(idx) => self.records[idx] = record,
            None => {
                self.by_hash.insert(record.hash.clone(), self.records.len());
                self.records.push(record);
            }
        }
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn counts(&self) -> MergeCounts {
        self.counts
    }

    /// Write every pending record to the store in first-seen order.
    pub fn flush<S: RuleStore + ?Sized>(self, store: &S) -> Result<MergeCounts> {
        let counts = self.counts;
        if !self.records.is_empty() {
            store.upsert_many(self.records)?;
        }
        Ok(counts)
    }
}
