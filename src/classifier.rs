//! Rule classification.
//!
//! Classification is split in two stages: [`classify`] turns a trimmed line
//! into a [`ClassifiedRule`] carrying the source-declared category and the
//! heuristic tags, and [`effective_category`] decides which category the rule
//! is filed under.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::category::Category;
use crate::mobile_heuristic::is_mobile_heuristic;
use crate::source::FilterSource;
use crate::RuleType;

/// Tag attached to mobile-related rules.
pub const MOBILE_TAG: &str = "mobile";

/// Hostname-shaped token, optionally preceded by pipes.
static HOSTNAME_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[|]*([a-zA-Z0-9][a-zA-Z0-9.-]*[.][a-zA-Z]{2,})").expect("valid hostname pattern")
});

/// A parsed `$` option of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Modifier {
    /// `domain=a.com|~b.com`
    Domain { domains: Vec<String> },
    /// `name=value`
    Value { name: String, value: String },
    /// `name`
    Flag { name: String },
}

impl Modifier {
    /// Name of the option.
    pub fn name(&self) -> &str {
        match self {
            Modifier::Domain { .. } => "domain",
            Modifier::Value { name, .. } | Modifier::Flag { name } => name,
        }
    }
}

/// Output of the classifier for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRule {
    pub raw: String,
    pub rule_type: RuleType,
    pub domain: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub tags: BTreeSet<String>,
    /// Category declared by the contributing source.
    pub declared_category: Category,
}

impl ClassifiedRule {
    pub fn is_mobile(&self) -> bool {
        self.tags.contains(MOBILE_TAG)
    }

    /// Category the rule is filed under, see [`effective_category`].
    pub fn effective_category(&self) -> Category {
        effective_category(self.declared_category, &self.tags)
    }
}

/// Check whether a trimmed line is a rule at all.
///
/// Empty lines, `!` comments and `[...]` directive headers are rejected.
pub fn is_rule_line(line: &str) -> bool {
    !(line.is_empty() || line.starts_with('!') || line.starts_with('['))
}

/// Classify a trimmed line contributed by `source`.
///
/// Returns `None` for lines that are not rules.
pub fn classify(line: &str, source: &FilterSource) -> Option<ClassifiedRule> {
    classify_with_category(line, source.category())
}

/// Classify a trimmed line against a declared category.
pub fn classify_with_category(line: &str, declared: Category) -> Option<ClassifiedRule> {
    if !is_rule_line(line) {
        return None;
    }

    let rule_type = RuleType::of(line);
    let domain = if rule_type.carries_domain() {
        extract_domain(line)
    } else {
        None
    };

    let mut tags = BTreeSet::new();
    if declared == Category::Mobile || is_mobile_heuristic(line) {
        tags.insert(MOBILE_TAG.to_string());
    }

    Some(ClassifiedRule {
        raw: line.to_string(),
        rule_type,
        domain,
        modifiers: parse_modifiers(line),
        tags,
        declared_category: declared,
    })
}

/// Resolve the category a rule is filed under.
///
/// Mobile-tagged rules are filed under [`Category::Mobile`] whatever their
/// source declared; everything else keeps the declared category.
pub fn effective_category(declared: Category, tags: &BTreeSet<String>) -> Category {
    if tags.contains(MOBILE_TAG) {
        Category::Mobile
    } else {
        declared
    }
}

/// Extract the target host of a rule, if it names one.
pub fn extract_domain(rule: &str) -> Option<String> {
    let rule = rule.strip_prefix("@@").unwrap_or(rule);

    if let Some(rest) = rule.strip_prefix("||") {
        let end = rest.find(['/', ':', '^']).unwrap_or(rest.len());
        let host = &rest[..end];
        return (!host.is_empty()).then(|| host.to_string());
    }

    if is_bare_hostname(rule) {
        return Some(rule.to_string());
    }

    HOSTNAME_TOKEN
        .captures(rule)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_bare_hostname(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
}

/// Parse the options after the last `$` of a rule.
///
/// Tokens are kept as written; nothing is validated.
pub fn parse_modifiers(rule: &str) -> Vec<Modifier> {
    let Some(idx) = rule.rfind('$') else {
        return Vec::new();
    };

    rule[idx + 1..]
        .split(',')
        .map(|token| {
            let (name, value) = match token.split_once('=') {
                Some((name, value)) => (name, value),
                None => (token, ""),
            };
            if value.is_empty() {
                Modifier::Flag {
                    name: name.to_string(),
                }
            } else if name == "domain" {
                Modifier::Domain {
                    domains: value.split('|').map(str::to_string).collect(),
                }
            } else {
                Modifier::Value {
                    name: name.to_string(),
                    value: value.to_string(),
                }
            }
        })
        .collect()
}
