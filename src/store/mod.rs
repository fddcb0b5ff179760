//! Persistent rule record stores.
//!
//! Records are keyed by fingerprint. Stores keep insertion order so that
//! exports break priority ties deterministically.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::rule::{RuleVariant, StoredRule};
use crate::{Result, RuleType};

/// Record store used by the ingestion and export pipelines.
pub trait RuleStore: Send + Sync {
    /// Look up a record by fingerprint.
    fn find_by_hash(&self, hash: &str) -> Result<Option<StoredRule>>;

    /// Look up a record by its exact raw text.
    fn find_by_raw(&self, raw: &str) -> Result<Option<StoredRule>>;

    /// Insert or replace the record with the same fingerprint.
    fn upsert(&self, rule: StoredRule) -> Result<()>;

    /// Insert or replace many records at once.
    fn upsert_many(&self, rules: Vec<StoredRule>) -> Result<()> {
        for rule in rules {
            self.upsert(rule)?;
        }
        Ok(())
    }

    /// Append a variant to an existing record.
    ///
    /// Returns `false` when no record has this fingerprint or the variant
    /// text is already present.
    fn append_variant(&self, hash: &str, variant: RuleVariant) -> Result<bool>;

    /// Records matching `selection`, in insertion order.
    fn select(&self, selection: &Selection) -> Result<Vec<StoredRule>>;

    /// Every record, in insertion order.
    fn all(&self) -> Result<Vec<StoredRule>> {
        self.select(&Selection::default())
    }

    /// Number of records (distinct fingerprints).
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every record.
    fn clear(&self) -> Result<()>;
}

/// Export selection predicate. Empty lists and `None` do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub exclude_categories: Vec<Category>,
    #[serde(default)]
    pub min_priority: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn excluding(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.exclude_categories = categories.into_iter().collect();
        self
    }

    pub fn with_min_priority(mut self, min_priority: i32) -> Self {
        self.min_priority = Some(min_priority);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check a record against every given criterion.
    pub fn matches(&self, rule: &StoredRule) -> bool {
        let category = rule.category();

        if !self.categories.is_empty() && !self.categories.contains(&category) {
            return false;
        }
        if self.exclude_categories.contains(&category) {
            return false;
        }
        if let Some(min) = self.min_priority {
            if rule.priority() < min {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| rule.tags().contains(t)) {
            return false;
        }
        true
    }
}

/// Record counts for the `stats` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub total_rules: usize,
    pub rule_types: BTreeMap<RuleType, usize>,
    pub categories: BTreeMap<Category, usize>,
}

impl StoreSummary {
    /// Count records by type and category.
    pub fn from_rules(rules: &[StoredRule]) -> Self {
        let mut summary = Self {
            total_rules: rules.len(),
            ..Default::default()
        };
        for rule in rules {
            *summary.rule_types.entry(rule.rule_type).or_default() += 1;
            *summary.categories.entry(rule.category()).or_default() += 1;
        }
        summary
    }
}
