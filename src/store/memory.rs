//! In-memory rule store.

use ahash::AHashMap;
use parking_lot::RwLock;

use super::{RuleStore, Selection};
use crate::rule::{RuleVariant, StoredRule};
use crate::Result;

#[derive(Debug, Default, Clone)]
struct Records {
    /// Records in insertion order
    rules: Vec<StoredRule>,
    /// Fingerprint -> index into `rules`
    by_hash: AHashMap<String, usize>,
    /// Raw text -> index into `rules`
    by_raw: AHashMap<String, usize>,
}

impl Records {
    fn upsert(&mut self, rule: StoredRule) {
        match self.by_hash.get(&rule.hash).copied() {
            Some(idx) => {
                let old_raw = std::mem::take(&mut self.rules[idx].raw);
                self.by_raw.remove(&old_raw);
                self.by_raw.insert(rule.raw.clone(), idx);
                self.rules[idx] = rule;
            }
            None => {
                let idx = self.rules.len();
                self.by_hash.insert(rule.hash.clone(), idx);
                self.by_raw.insert(rule.raw.clone(), idx);
                self.rules.push(rule);
            }
        }
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `rules`, later duplicates replacing earlier ones.
    pub fn from_rules(rules: impl IntoIterator<Item = StoredRule>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.write();
            for rule in rules {
                records.upsert(rule);
            }
        }
        store
    }

    /// Snapshot of every record in insertion order.
    pub(crate) fn snapshot(&self) -> Vec<StoredRule> {
        self.records.read().rules.clone()
    }

    /// Replace every record with `rules`.
    pub(crate) fn restore(&self, rules: Vec<StoredRule>) {
        let mut records = Records::default();
        for rule in rules {
            records.upsert(rule);
        }
        *self.records.write() = records;
    }
}

impl RuleStore for MemoryStore {
    fn find_by_hash(&self, hash: &str) -> Result<Option<StoredRule>> {
        let records = self.records.read();
        Ok(records.by_hash.get(hash).map(|&idx| records.rules[idx].clone()))
    }

    fn find_by_raw(&self, raw: &str) -> Result<Option<StoredRule>> {
        let records = self.records.read();
        Ok(records.by_raw.get(raw).map(|&idx| records.rules[idx].clone()))
    }

    fn upsert(&self, rule: StoredRule) -> Result<()> {
        self.records.write().upsert(rule);
        Ok(())
    }

    fn upsert_many(&self, rules: Vec<StoredRule>) -> Result<()> {
        let mut records = self.records.write();
        for rule in rules {
            records.upsert(rule);
        }
        Ok(())
    }

    fn append_variant(&self, hash: &str, variant: RuleVariant) -> Result<bool> {
        let mut records = self.records.write();
        let Some(idx) = records.by_hash.get(hash).copied() else {
            return Ok(false);
        };
        let rule = &mut records.rules[idx];
        if rule.has_variant(&variant.rule_text) {
            return Ok(false);
        }
        rule.variants.push(variant);
        Ok(true)
    }

    fn select(&self, selection: &Selection) -> Result<Vec<StoredRule>> {
        let records = self.records.read();
        Ok(records
            .rules
            .iter()
            .filter(|rule| selection.matches(rule))
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.read().rules.len())
    }

    fn clear(&self) -> Result<()> {
        *self.records.write() = Records::default();
        Ok(())
    }
}
