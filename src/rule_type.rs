//! Rule type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RuleType is the syntactic kind of a filter rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Network rule anchored on a host (`||host^`)
    Domain,
    /// Regular expression rule (`/.../`)
    Regex,
    /// Allowlist rule (`@@...`)
    Exception,
    /// Element hiding rule (`##`, `#@#`)
    Cosmetic,
    /// Anything else
    Unknown,
}

impl RuleType {
    /// All rule types, in display order.
    pub const ALL: [RuleType; 5] = [
        RuleType::Domain,
        RuleType::Regex,
        RuleType::Exception,
        RuleType::Cosmetic,
        RuleType::Unknown,
    ];

    /// Parse a rule type from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "domain" => Some(RuleType::Domain),
            "regex" => Some(RuleType::Regex),
            "exception" => Some(RuleType::Exception),
            "cosmetic" => Some(RuleType::Cosmetic),
            "unknown" => Some(RuleType::Unknown),
            _ => None,
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Domain => "domain",
            RuleType::Regex => "regex",
            RuleType::Exception => "exception",
            RuleType::Cosmetic => "cosmetic",
            RuleType::Unknown => "unknown",
        }
    }

    /// Determine the type of a trimmed rule line.
    ///
    /// First match wins: `@@` prefix, then `/.../` delimiters, then `||`
    /// prefix or `^` anywhere, then `##` / `#@#`. Anchored regexes and
    /// allowlist rules both contain `^`, so they are checked first.
    pub fn of(rule: &str) -> Self {
        if rule.starts_with("@@") {
            RuleType::Exception
        } else if rule.len() >= 2 && rule.starts_with('/') && rule.ends_with('/') {
            RuleType::Regex
        } else if rule.starts_with("||") || rule.contains('^') {
            RuleType::Domain
        } else if rule.contains("##") || rule.contains("#@#") {
            RuleType::Cosmetic
        } else {
            RuleType::Unknown
        }
    }

    /// Whether a domain may be extracted from rules of this type.
    ///
    /// The host inside a cosmetic rule scopes an element selector and the
    /// text of a regex rule is a pattern, so neither names a blockable host.
    pub fn carries_domain(&self) -> bool {
        !matches!(self, RuleType::Cosmetic | RuleType::Regex)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_from_str() {
        assert_eq!(RuleType::parse("domain"), Some(RuleType::Domain));
        assert_eq!(RuleType::parse("DOMAIN"), Some(RuleType::Domain));
        assert_eq!(RuleType::parse("Regex"), Some(RuleType::Regex));
        assert_eq!(RuleType::parse("exception"), Some(RuleType::Exception));
        assert_eq!(RuleType::parse("cosmetic"), Some(RuleType::Cosmetic));
        assert_eq!(RuleType::parse("unknown"), Some(RuleType::Unknown));
        assert_eq!(RuleType::parse("ip-cidr"), None);
    }

    #[test]
    fn test_type_precedence() {
        assert_eq!(RuleType::of("||ads.example.com^"), RuleType::Domain);
        assert_eq!(RuleType::of("ads.example.com^$third-party"), RuleType::Domain);
        assert_eq!(RuleType::of("/^https?:\\/\\/track\\./"), RuleType::Regex);
        assert_eq!(RuleType::of("@@||example.com/allow^"), RuleType::Exception);
        assert_eq!(RuleType::of("@@example.com"), RuleType::Exception);
        assert_eq!(RuleType::of("example.com##.banner"), RuleType::Cosmetic);
        assert_eq!(RuleType::of("example.com#@#.banner"), RuleType::Cosmetic);
        assert_eq!(RuleType::of("tracker.example.net"), RuleType::Unknown);
        // a lone slash is not a regex
        assert_eq!(RuleType::of("/"), RuleType::Unknown);
    }

    #[test]
    fn test_domain_rule_wins_over_cosmetic() {
        // `^` is checked before `##`
        assert_eq!(RuleType::of("example.com^##.ad"), RuleType::Domain);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RuleType::Exception).unwrap();
        assert_eq!(json, "\"exception\"");
        let back: RuleType = serde_json::from_str("\"cosmetic\"").unwrap();
        assert_eq!(back, RuleType::Cosmetic);
    }
}
