//! Ingestion pipeline.
//!
//! Sources are processed one at a time in declared order: resolve, fetch,
//! classify, merge, flush. A source that cannot be resolved or fetched is
//! recorded in the run summary and skipped; store failures end the run.

use ahash::AHashSet;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::category::Category;
use crate::classifier::classify;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, HttpClient, ReqwestClient};
use crate::merge::{MergeBatch, MergeCounts};
use crate::rule::StoredRule;
use crate::source::{FilterSource, RawSource};
use crate::store::RuleStore;

/// A source that was skipped because of a source-scoped error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Enabled sources the run tried to process
    pub sources_attempted: usize,
    pub sources_succeeded: usize,
    pub sources_failed: usize,
    /// Rule lines processed across all sources
    pub total_rules: usize,
    /// Distinct fingerprints seen in this run
    pub unique_rules: usize,
    pub rules_per_source: BTreeMap<String, usize>,
    /// Keyed by the category each source declared
    pub rules_per_category: BTreeMap<Category, usize>,
    pub errors: Vec<SourceFailure>,
    #[serde(skip)]
    pub merges: MergeCounts,
}

impl RunStats {
    fn fail(&mut self, source: &str, error: &Error) {
        log::error!("Error processing source {}: {}", source, error);
        self.sources_failed += 1;
        self.errors.push(SourceFailure {
            source: source.to_string(),
            error: error.to_string(),
        });
    }
}

/// Fetches every configured source and merges its rules into a store.
pub struct IngestPipeline<'a, S: RuleStore + ?Sized, C: HttpClient = ReqwestClient> {
    store: &'a S,
    fetcher: Fetcher<C>,
}

impl<'a, S: RuleStore + ?Sized, C: HttpClient> IngestPipeline<'a, S, C> {
    pub fn new(store: &'a S, fetcher: Fetcher<C>) -> Self {
        Self { store, fetcher }
    }

    /// Process `sources` in order.
    ///
    /// Disabled sources are skipped without being counted. Returns
    /// [`Error::NoSources`] for an empty list.
    pub fn run(&self, sources: &[RawSource]) -> Result<RunStats> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }

        let mut stats = RunStats::default();
        let mut seen = AHashSet::new();

        for raw in sources {
            if !raw.is_enabled() {
                log::debug!("Skipping disabled source {}", raw.display_name());
                continue;
            }
            stats.sources_attempted += 1;

            let source = match FilterSource::resolve(raw) {
                Ok(source) => source,
                Err(e) => {
                    stats.fail(raw.display_name(), &e);
                    continue;
                }
            };

            log::info!("Processing source: {} ({})", source.name(), source.url());
            let body = match self.fetcher.fetch(source.url()) {
                Ok(body) => body,
                Err(e) if e.is_source_scoped() => {
                    stats.fail(source.name(), &e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let (count, merges) = self.ingest_body(&source, &body, &mut seen)?;

            log::info!(
                "Processed {} rules from {} ({} new, {} merged)",
                count,
                source.name(),
                merges.inserted + merges.overwritten,
                merges.merged
            );
            stats.sources_succeeded += 1;
            stats.total_rules += count;
            *stats
                .rules_per_source
                .entry(source.name().to_string())
                .or_default() += count;
            *stats.rules_per_category.entry(source.category()).or_default() += count;
            stats.merges.inserted += merges.inserted;
            stats.merges.overwritten += merges.overwritten;
            stats.merges.merged += merges.merged;
            stats.merges.variants_added += merges.variants_added;
        }

        stats.unique_rules = seen.len();
        log::info!(
            "Import finished: {}/{} sources, {} rules ({} unique)",
            stats.sources_succeeded,
            stats.sources_attempted,
            stats.total_rules,
            stats.unique_rules
        );
        Ok(stats)
    }

    /// Classify and merge one downloaded list, flushing it as a single batch.
    ///
    /// Returns the number of rule lines and the merge counters. Fingerprints
    /// are added to `seen`.
    pub fn ingest_body(
        &self,
        source: &FilterSource,
        body: &str,
        seen: &mut AHashSet<String>,
    ) -> Result<(usize, MergeCounts)> {
        let now = Utc::now();
        let mut batch = MergeBatch::new();
        let mut count = 0;

        for line in body.lines() {
            let Some(rule) = classify(line.trim(), source) else {
                continue;
            };
            let candidate = StoredRule::candidate(rule, source, now);
            seen.insert(candidate.hash.clone());
            batch.merge(self.store, candidate, now)?;
            count += 1;
        }

        let counts = batch.flush(self.store)?;
        Ok((count, counts))
    }
}
