//! Filter list metadata written into exported headers.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::rule::StoredRule;

pub const DEFAULT_TITLE: &str = "Blockingmachine Filter List";
pub const DEFAULT_DESCRIPTION: &str = "Combined filter list from multiple sources";
pub const DEFAULT_HOMEPAGE: &str = "https://github.com/danielhipskind/blockingmachine";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Rule counts shown in list headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStats {
    pub total_rules: usize,
    pub blocking_rules: usize,
    pub unblocking_rules: usize,
}

impl ListStats {
    /// Count blocking and allowlisting rules.
    pub fn from_rules(rules: &[StoredRule]) -> Self {
        let unblocking_rules = rules.iter().filter(|r| r.is_exception()).count();
        Self {
            total_rules: rules.len(),
            blocking_rules: rules.len() - unblocking_rules,
            unblocking_rules,
        }
    }
}

/// Metadata of an exported filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterListMetadata {
    pub title: String,
    pub description: String,
    pub homepage: String,
    pub version: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub madeby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ListStats>,
}

impl Default for FilterListMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            homepage: DEFAULT_HOMEPAGE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            last_updated: now_rfc3339(),
            website: Some(DEFAULT_HOMEPAGE.to_string()),
            madeby: Some("Blockingmachine".to_string()),
            expires: Some("1 day".to_string()),
            license: Some("BSD-3-Clause".to_string()),
            stats: None,
        }
    }
}

impl FilterListMetadata {
    /// Minimal metadata with only the required fields.
    pub fn new(title: &str, description: &str, homepage: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            homepage: homepage.to_string(),
            version: version.to_string(),
            last_updated: now_rfc3339(),
            website: None,
            madeby: None,
            expires: None,
            license: None,
            stats: None,
        }
    }

    /// Set the timestamp to now.
    pub fn touch(mut self) -> Self {
        self.last_updated = now_rfc3339();
        self
    }
}

/// Metadata as written in the config file: every field optional, merged over defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub version: Option<String>,
    pub website: Option<String>,
    pub madeby: Option<String>,
    pub expires: Option<String>,
    pub license: Option<String>,
}

impl MetadataOverrides {
    /// Apply the overrides on top of the defaults, stamping the current time.
    pub fn resolve(&self) -> FilterListMetadata {
        let mut meta = FilterListMetadata::default();
        let pick = |value: &Option<String>, default: String| value.clone().unwrap_or(default);

        meta.title = pick(&self.title, meta.title);
        meta.description = pick(&self.description, meta.description);
        meta.homepage = pick(&self.homepage, meta.homepage);
        meta.version = pick(&self.version, meta.version);
        meta.website = self.website.clone().or(meta.website);
        meta.madeby = self.madeby.clone().or(meta.madeby);
        meta.expires = self.expires.clone().or(meta.expires);
        meta.license = self.license.clone().or(meta.license);
        meta
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::source::{FilterSource, RawSource};

    #[test]
    fn test_defaults() {
        let meta = FilterListMetadata::default();
        assert_eq!(meta.title, DEFAULT_TITLE);
        assert_eq!(meta.expires.as_deref(), Some("1 day"));
        assert!(meta.last_updated.ends_with('Z'));
        assert!(meta.stats.is_none());
    }

    #[test]
    fn test_overrides() {
        let overrides = MetadataOverrides {
            title: Some("My List".into()),
            license: Some("MIT".into()),
            ..Default::default()
        };
        let meta = overrides.resolve();
        assert_eq!(meta.title, "My List");
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
        assert_eq!(meta.madeby.as_deref(), Some("Blockingmachine"));
    }

    #[test]
    fn test_overrides_from_yaml() {
        let overrides: MetadataOverrides =
            serde_yaml::from_str("title: Home DNS\nversion: 2.1.0\n").unwrap();
        let meta = overrides.resolve();
        assert_eq!(meta.title, "Home DNS");
        assert_eq!(meta.version, "2.1.0");
    }

    #[test]
    fn test_list_stats() {
        let src = FilterSource::resolve(&RawSource::new("a", "https://a.example/l", "privacy"))
            .unwrap();
        let rules: Vec<_> = ["||a.com^", "||b.com^", "@@||c.com^"]
            .iter()
            .map(|l| StoredRule::candidate(classify(l, &src).unwrap(), &src, Utc::now()))
            .collect();
        let stats = ListStats::from_rules(&rules);
        assert_eq!(
            stats,
            ListStats {
                total_rules: 3,
                blocking_rules: 2,
                unblocking_rules: 1
            }
        );
    }
}
