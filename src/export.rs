//! Export pipeline: select, sort, compile and write filter lists.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::compiler::{compile, Format};
use crate::metadata::{FilterListMetadata, ListStats};
use crate::rule::StoredRule;
use crate::store::{RuleStore, Selection};
use crate::Result;

/// Format used when none is requested.
pub const DEFAULT_FORMAT: &str = "adguard";

/// Export options: which records, which formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(flatten)]
    pub selection: Selection,
    /// Format identifiers, kept as text so unknown ones can be reported
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_formats() -> Vec<String> {
    vec![DEFAULT_FORMAT.to_string()]
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            formats: default_formats(),
        }
    }
}

impl ExportOptions {
    pub fn with_formats<I, T>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Resolve the requested identifiers, expanding `all` and dropping duplicates.
    ///
    /// Returns the formats to write and the identifiers that were not recognised.
    pub fn resolve_formats(&self) -> (Vec<Format>, Vec<String>) {
        let ids = if self.formats.is_empty() {
            default_formats()
        } else {
            self.formats.clone()
        };
        let mut formats = Vec::new();
        let mut unknown = Vec::new();

        for id in ids {
            match Format::expand(&id) {
                Ok(expanded) => {
                    for format in expanded {
                        if !formats.contains(&format) {
                            formats.push(format);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Skipping export: {}", e);
                    unknown.push(id);
                }
            }
        }
        (formats, unknown)
    }
}

/// Outcome of an export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Number of records written to every document
    pub rule_count: usize,
    /// Documents written
    pub written: Vec<PathBuf>,
    /// Unrecognised format identifiers
    pub skipped_formats: Vec<String>,
    /// Formats whose document could not be written
    pub failed: Vec<(Format, String)>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.skipped_formats.is_empty() && self.failed.is_empty()
    }
}

/// Select records and sort them by priority, highest first.
///
/// The sort is stable, so equal priorities keep store order.
pub fn select_rules<S: RuleStore + ?Sized>(store: &S, selection: &Selection) -> Result<Vec<StoredRule>> {
    let mut rules = store.select(selection)?;
    rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    Ok(rules)
}

/// Export the selected records in every requested format to `output_dir`.
///
/// Unknown formats are skipped with a warning and a failed write only
/// affects its own format. Store errors propagate.
pub fn export_with_options<S: RuleStore + ?Sized>(
    store: &S,
    output_dir: &Path,
    meta: &FilterListMetadata,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let rules = select_rules(store, &options.selection)?;
    let (formats, skipped_formats) = options.resolve_formats();

    let mut meta = meta.clone();
    if meta.stats.is_none() {
        meta.stats = Some(ListStats::from_rules(&rules));
    }

    let mut report = ExportReport {
        rule_count: rules.len(),
        skipped_formats,
        ..Default::default()
    };

    for format in formats {
        match export_format(format, output_dir, &rules, &meta) {
            Ok(path) => {
                log::info!("Exported {} rules to {:?}", rules.len(), path);
                report.written.push(path);
            }
            Err(e) => {
                log::error!("Failed to export {} format: {}", format, e);
                report.failed.push((format, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Compile and write one document, returning its path.
pub fn export_format(
    format: Format,
    output_dir: &Path,
    rules: &[StoredRule],
    meta: &FilterListMetadata,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format.file_name());
    let content = compile(rules, meta, format);

    let mut temp = tempfile::NamedTempFile::new_in(output_dir)?;
    temp.write_all(content.as_bytes())?;
    temp.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}

/// Remove previously exported documents from `output_dir`.
///
/// Returns the number of files removed; a missing directory removes nothing.
pub fn clean_output_dir(output_dir: &Path) -> Result<usize> {
    if !output_dir.exists() {
        log::warn!(
            "Output directory {:?} does not exist. Skipping file cleanup.",
            output_dir
        );
        return Ok(0);
    }

    let mut removed = 0;
    for format in Format::ALL {
        let path = output_dir.join(format.file_name());
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    log::info!("Cleaned {} file(s) from {:?}", removed, output_dir);
    Ok(removed)
}
