//! Category registry.
//!
//! Categories are a closed set. Each identifier maps to exactly one entry of
//! the immutable [`REGISTRY`] table, which carries its description, default
//! priority and enabled flag.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A fixed classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Advertising,
    Tracking,
    Malicious,
    Social,
    Utility,
    Blockingmachine,
    Privacy,
    Security,
    Mobile,
    Gaming,
    Dns,
    Annoyances,
    Custom,
}

/// Registry entry for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: Category,
    pub description: &'static str,
    pub priority: i32,
    pub enabled: bool,
}

const fn entry(
    category: Category,
    description: &'static str,
    priority: i32,
    enabled: bool,
) -> CategoryInfo {
    CategoryInfo {
        category,
        description,
        priority,
        enabled,
    }
}

/// The category registry, one entry per [`Category`] variant in declaration order.
pub static REGISTRY: [CategoryInfo; 13] = [
    entry(Category::Advertising, "Advertising domains", 10, true),
    entry(Category::Tracking, "Tracking and telemetry domains", 20, true),
    entry(Category::Malicious, "Malware and phishing domains", 0, true),
    entry(Category::Social, "Social media domains", 30, false),
    entry(Category::Utility, "Utility and functional domains", 40, false),
    entry(Category::Blockingmachine, "Blockingmachine list", 5, true),
    entry(Category::Privacy, "Privacy protection domains", 15, true),
    entry(Category::Security, "Security threats", 0, true),
    entry(Category::Mobile, "Mobile app tracking", 25, true),
    entry(Category::Gaming, "Gaming related ads", 35, false),
    entry(Category::Dns, "DNS related domains", 45, true),
    entry(Category::Annoyances, "Annoyances and popups", 50, false),
    entry(Category::Custom, "Custom user-defined domains", 5, true),
];

impl Category {
    /// Get the identifier of this category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Advertising => "advertising",
            Category::Tracking => "tracking",
            Category::Malicious => "malicious",
            Category::Social => "social",
            Category::Utility => "utility",
            Category::Blockingmachine => "blockingmachine",
            Category::Privacy => "privacy",
            Category::Security => "security",
            Category::Mobile => "mobile",
            Category::Gaming => "gaming",
            Category::Dns => "dns",
            Category::Annoyances => "annoyances",
            Category::Custom => "custom",
        }
    }

    /// Parse a category identifier (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        REGISTRY
            .iter()
            .map(|info| info.category)
            .find(|c| c.name() == s)
    }

    /// Parse a category identifier, failing with [`Error::InvalidCategory`].
    pub fn validate(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }

    /// Get the registry entry for this category.
    pub fn info(&self) -> &'static CategoryInfo {
        &REGISTRY[*self as usize]
    }

    /// Default priority of this category.
    pub fn priority(&self) -> i32 {
        self.info().priority
    }

    /// Description of this category.
    pub fn description(&self) -> &'static str {
        self.info().description
    }

    /// Whether the category is enabled in the registry.
    pub fn enabled(&self) -> bool {
        self.info().enabled
    }

    /// Iterate over every registered category.
    pub fn all() -> impl Iterator<Item = Category> {
        REGISTRY.iter().map(|info| info.category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::validate(s)
    }
}
