//! JSON file backed rule store.
//!
//! The whole record set lives in memory and is written back after every
//! mutation. Writes go to a temporary file in the same directory which is
//! then renamed over the store file, so readers never see a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{MemoryStore, RuleStore, Selection};
use crate::error::{Error, Result};
use crate::rule::{RuleVariant, StoredRule};

/// Rule store persisted as a JSON array of records.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Persist(format!("failed to read {:?}: {}", path, e)))?;
            let rules: Vec<StoredRule> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::Persist(format!("failed to parse {:?}: {}", path, e))
                })?
            };
            log::debug!("Loaded {} rules from {:?}", rules.len(), path);
            MemoryStore::from_rules(rules)
        } else {
            MemoryStore::new()
        };

        Ok(Self { path, records })
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a mutation and write the file, rolling the records back if the
    /// write fails.
    fn commit<T>(&self, apply: impl FnOnce(&MemoryStore) -> Result<T>) -> Result<T> {
        let previous = self.records.snapshot();
        let value = apply(&self.records)?;
        if let Err(e) = self.save() {
            self.records.restore(previous);
            return Err(e);
        }
        Ok(value)
    }

    fn save(&self) -> Result<()> {
        self.write_file()
            .map_err(|e| Error::Persist(format!("failed to write {:?}: {}", self.path, e)))
    }

    fn write_file(&self) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let data = serde_json::to_vec(&self.records.snapshot())?;
        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(&data)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl RuleStore for JsonFileStore {
    fn find_by_hash(&self, hash: &str) -> Result<Option<StoredRule>> {
        self.records.find_by_hash(hash)
    }

    fn find_by_raw(&self, raw: &str) -> Result<Option<StoredRule>> {
        self.records.find_by_raw(raw)
    }

    fn upsert(&self, rule: StoredRule) -> Result<()> {
        self.commit(|records| records.upsert(rule))
    }

    fn upsert_many(&self, rules: Vec<StoredRule>) -> Result<()> {
        self.commit(|records| records.upsert_many(rules))
    }

    fn append_variant(&self, hash: &str, variant: RuleVariant) -> Result<bool> {
        if self.records.find_by_hash(hash)?.is_none() {
            return Ok(false);
        }
        self.commit(|records| records.append_variant(hash, variant))
    }

    fn select(&self, selection: &Selection) -> Result<Vec<StoredRule>> {
        self.records.select(selection)
    }

    fn len(&self) -> Result<usize> {
        self.records.len()
    }

    fn clear(&self) -> Result<()> {
        self.commit(|records| records.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::source::{FilterSource, RawSource};
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(line: &str) -> StoredRule {
        let src = FilterSource::resolve(&RawSource::new("a", "https://a.example/list", "privacy"))
            .unwrap();
        StoredRule::candidate(classify(line, &src).unwrap(), &src, Utc::now())
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("rules.json")).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_persists_across_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("rules.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .upsert_many(vec![record("||a.com^"), record("||b.com^")])
                .unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        let all = store.all().unwrap();
        assert_eq!(all[0].raw, "||a.com^");
        assert_eq!(all[1].raw, "||b.com^");
        assert!(store.find_by_raw("||b.com^").unwrap().is_some());
    }

    #[test]
    fn test_append_variant_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let rule = record("||a.com^");
        let hash = rule.hash.clone();
        let mut variant = rule.variants[0].clone();
        variant.rule_text = "||a.com^$popup".into();

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.upsert(rule).unwrap();
            assert!(store.append_variant(&hash, variant).unwrap());
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.find_by_hash(&hash).unwrap().unwrap().variants.len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_persist_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(Error::Persist(_))));
    }

    #[test]
    fn test_failed_write_keeps_records_unchanged() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = JsonFileStore::open(nested.join("rules.json")).unwrap();
        store.upsert(record("||a.com^")).unwrap();

        // the store directory can no longer be created
        fs::remove_dir_all(&nested).unwrap();
        fs::write(&nested, "not a directory").unwrap();

        assert!(matches!(store.upsert(record("||b.com^")), Err(Error::Persist(_))));
        assert!(matches!(
            store.upsert_many(vec![record("||c.com^")]),
            Err(Error::Persist(_))
        ));
        assert!(matches!(store.clear(), Err(Error::Persist(_))));

        assert_eq!(store.len().unwrap(), 1);
        assert!(store.find_by_raw("||a.com^").unwrap().is_some());
        assert!(store.find_by_raw("||b.com^").unwrap().is_none());
    }

    #[test]
    fn test_clear_truncates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.upsert(record("||a.com^")).unwrap();
        store.clear().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 0);
    }
}
