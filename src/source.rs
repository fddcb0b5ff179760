//! Filter list sources.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{Error, Result};

/// A source as written in the configuration file, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub trusted: Option<bool>,
}

impl RawSource {
    /// Create a raw source with the required fields set.
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            url: Some(url.to_string()),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    /// Whether the source is enabled. Sources are enabled unless disabled explicitly.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Name for log lines, even when the name is missing.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "<unnamed>",
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_trusted(mut self, trusted: bool) -> Self {
        self.trusted = Some(trusted);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// A validated, fully-defaulted filter list source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSource {
    name: String,
    url: String,
    category: Category,
    enabled: bool,
    priority: i32,
    trusted: bool,
}

impl FilterSource {
    /// Build a source from its raw configuration.
    ///
    /// Name and url must be non-empty, the url must use http or https and the
    /// category must be registered. Priority defaults to the category's
    /// registry priority, `trusted` to false and `enabled` to true.
    pub fn resolve(raw: &RawSource) -> Result<Self> {
        let name = non_empty(raw.name.as_deref())
            .ok_or_else(|| Error::Config("source must have a name and url".to_string()))?;
        let url = non_empty(raw.url.as_deref()).ok_or_else(|| {
            Error::Config(format!("source {} must have a name and url", name))
        })?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "source {} has an invalid url: {}",
                name, url
            )));
        }

        let category = match non_empty(raw.category.as_deref()) {
            Some(c) => Category::validate(c)?,
            None => {
                return Err(Error::Config(format!(
                    "source {} must have a category",
                    name
                )))
            }
        };

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            category,
            enabled: raw.enabled.unwrap_or(true),
            priority: raw.priority.unwrap_or_else(|| category.priority()),
            trusted: raw.trusted.unwrap_or(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Category declared by the source.
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn trusted(&self) -> bool {
        self.trusted
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
