//! Stored rule records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::category::Category;
use crate::classifier::{ClassifiedRule, Modifier};
use crate::fingerprint::fingerprint;
use crate::source::FilterSource;
use crate::RuleType;

/// Where a record came from, as of its creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Effective category of the rule
    pub category: Category,
    /// Resolved priority, used for export ordering and filtering
    pub priority: i32,
    pub trusted: bool,
    pub url: String,
}

/// Bookkeeping for a stored rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    /// Names of every source that contributed this rule
    pub sources: BTreeSet<String>,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub enabled: bool,
    pub source_info: SourceInfo,
    pub tags: BTreeSet<String>,
}

/// One occurrence of a rule's exact text contributed by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleVariant {
    pub rule_text: String,
    pub source_name: String,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// A merged rule record, keyed by its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    pub raw: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub hash: String,
    pub metadata: RuleMetadata,
    #[serde(default)]
    pub variants: Vec<RuleVariant>,
}

impl StoredRule {
    /// Build the candidate record for a freshly classified rule.
    ///
    /// The record carries exactly one variant. Its category is the rule's
    /// effective category; its priority is the source's priority unless the
    /// effective category overrides the declared one, in which case the
    /// registry priority of the effective category applies.
    pub fn candidate(rule: ClassifiedRule, source: &FilterSource, now: DateTime<Utc>) -> Self {
        let category = rule.effective_category();
        let priority = if category == source.category() {
            source.priority()
        } else {
            category.priority()
        };

        let variant = RuleVariant {
            rule_text: rule.raw.clone(),
            source_name: source.name().to_string(),
            date_added: now,
            modifiers: rule.modifiers,
            tags: rule.tags.clone(),
        };

        Self {
            hash: fingerprint(&rule.raw),
            raw: rule.raw,
            rule_type: rule.rule_type,
            domain: rule.domain,
            metadata: RuleMetadata {
                sources: BTreeSet::from([source.name().to_string()]),
                date_added: now,
                last_updated: now,
                enabled: true,
                source_info: SourceInfo {
                    category,
                    priority,
                    trusted: source.trusted(),
                    url: source.url().to_string(),
                },
                tags: rule.tags,
            },
            variants: vec![variant],
        }
    }

    pub fn category(&self) -> Category {
        self.metadata.source_info.category
    }

    pub fn priority(&self) -> i32 {
        self.metadata.source_info.priority
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.metadata.tags
    }

    /// Whether a variant with exactly this text is already recorded.
    pub fn has_variant(&self, rule_text: &str) -> bool {
        self.variants.iter().any(|v| v.rule_text == rule_text)
    }

    /// Whether this rule allowlists rather than blocks.
    pub fn is_exception(&self) -> bool {
        self.rule_type == RuleType::Exception
    }
}
