//! Blockingmachine - a filter list manager and compiler.
//!
//! This crate downloads community filter lists (AdGuard/ABP syntax), merges
//! their rules into a deduplicated record store and compiles the result into
//! the syntaxes of common DNS and content blockers.
//!
//! # Features
//!
//! - **Classification**: Rule type, target domain, `$` modifiers and mobile tagging
//! - **Deduplication**: Rules are keyed by the SHA-256 of their trimmed text
//! - **Provenance**: Every record keeps the sources and text variants it was seen in
//! - **Resilient imports**: Retried downloads with exponential backoff; a failing
//!   source never aborts the run
//! - **Export formats**: hosts, dnsmasq, unbound, BIND, Privoxy, Shadowrocket,
//!   AdGuard and ABP
//!
//! # Quick Start
//!
//! ```no_run
//! use blockingmachine::{
//!     export_with_options, ExportOptions, FilterListMetadata, Fetcher, IngestPipeline,
//!     JsonFileStore, RawSource,
//! };
//! use std::path::Path;
//!
//! let store = JsonFileStore::open("filters/rules.json")?;
//! let sources = [RawSource::new(
//!     "EasyList",
//!     "https://easylist.to/easylist/easylist.txt",
//!     "advertising",
//! )];
//!
//! let stats = IngestPipeline::new(&store, Fetcher::new()?).run(&sources)?;
//! println!("{} unique rules", stats.unique_rules);
//!
//! let options = ExportOptions::default().with_formats(["hosts", "adguard"]);
//! export_with_options(
//!     &store,
//!     Path::new("filters/output"),
//!     &FilterListMetadata::default(),
//!     &options,
//! )?;
//! # Ok::<(), blockingmachine::Error>(())
//! ```
//!
//! # Rule Types
//!
//! - **exception**: `@@` allowlist rules
//! - **regex**: `/.../` patterns
//! - **domain**: `||host^` and other anchored network rules
//! - **cosmetic**: `##` / `#@#` element hiding rules
//! - **unknown**: anything else
//!
//! # Merging
//!
//! A rule seen again (from any source) extends the existing record: its
//! source set and tags are unioned and a new text variant is appended only
//! if it was not already recorded. Rules from `custom` sources replace the
//! existing record outright.

mod error;
mod rule_type;

pub mod category;
pub mod classifier;
pub mod compiler;
pub mod config;
pub mod export;
pub mod fetcher;
pub mod fingerprint;
pub mod ingest;
pub mod merge;
pub mod metadata;
pub mod mobile_heuristic;
pub mod rule;
pub mod source;
pub mod store;

pub use category::{Category, CategoryInfo, REGISTRY};
pub use classifier::{classify, ClassifiedRule, Modifier};
pub use compiler::{compile, Format};
pub use config::AppConfig;
pub use error::{Error, FetchFailure, Result};
pub use export::{clean_output_dir, export_with_options, ExportOptions, ExportReport};
pub use fetcher::{Fetcher, HttpClient, ReqwestClient, RetryPolicy};
pub use fingerprint::fingerprint;
pub use ingest::{IngestPipeline, RunStats, SourceFailure};
pub use merge::{merge, MergeBatch, MergeCounts, MergeOutcome};
pub use metadata::{FilterListMetadata, ListStats, MetadataOverrides};
pub use rule::{RuleMetadata, RuleVariant, SourceInfo, StoredRule};
pub use rule_type::RuleType;
pub use source::{FilterSource, RawSource};
pub use store::{JsonFileStore, MemoryStore, RuleStore, Selection, StoreSummary};
