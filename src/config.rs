//! YAML configuration.
//!
//! A config file lists the sources to import plus output, store, metadata
//! and export defaults. Relative paths resolve against `baseDir`, which
//! defaults to the directory holding the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::export::ExportOptions;
use crate::metadata::MetadataOverrides;
use crate::source::RawSource;

/// File names searched, in order, by [`AppConfig::discover`].
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".blockingmachinerc",
    ".blockingmachinerc.yaml",
    ".blockingmachinerc.yml",
    "blockingmachine.config.yaml",
    "blockingmachine.config.yml",
];

const DEFAULT_OUTPUT_DIR: &str = "./filters/output";
const DEFAULT_STORE_PATH: &str = "./filters/rules.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub meta: MetadataOverrides,
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub sources: Vec<RawSource>,
}

impl AppConfig {
    /// Parse a YAML document without touching the filesystem.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        if config.sources.is_empty() {
            return Err(Error::NoSources);
        }
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::parse(&content)?;

        if config.base_dir.is_none() {
            config.base_dir = path.parent().map(Path::to_path_buf);
        }
        log::debug!("Loaded config from {:?} ({} sources)", path, config.sources.len());
        Ok(config)
    }

    /// Find the first known config file name in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::ConfigNotFound(dir.display().to_string()))
    }

    /// Resolve `path` against the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.output.directory)
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve_path(&self.store.path)
    }
}
