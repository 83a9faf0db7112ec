//! Session lifecycle: one owner for config, index, engine, and report.
//!
//! The session is the crate's front door. Hosts construct one per tour,
//! initialize it with the content tree, and route every query and
//! configuration update through it. There is no global state; two sessions
//! never interfere.
//!
//! Rebuilds are wholesale: a configuration change or re-decoration replaces
//! the record set and the engine together. The generation counter makes
//! pending external decorations last-write-wins: business data parsed
//! against an older build is dropped instead of decorating records it was
//! never computed for.

use serde_json::Value;

use crate::build::{build_index, BuildReport};
use crate::config::{self, SearchConfig};
use crate::engine::WeightedFuzzyEngine;
use crate::error::ConfigError;
use crate::external::{decorate_records, MergeStats};
use crate::query::{QueryEngine, SearchOutcome};
use crate::types::{BusinessData, IndexRecord};

pub struct SearchSession {
    config: SearchConfig,
    tour: Option<Value>,
    records: Vec<IndexRecord>,
    query: QueryEngine,
    report: BuildReport,
    initialized: bool,
    generation: u64,
}

impl SearchSession {
    pub fn new(config: SearchConfig) -> Self {
        let query = QueryEngine::new(Box::new(WeightedFuzzyEngine::empty()), &config);
        SearchSession {
            config,
            tour: None,
            records: Vec::new(),
            query,
            report: BuildReport::default(),
            initialized: false,
            generation: 0,
        }
    }

    /// Build the index from a tour content tree.
    ///
    /// Idempotent: a second call while initialized is a no-op, so hosts can
    /// wire this to an event that may fire more than once.
    pub fn initialize(&mut self, tour: &Value) {
        if self.initialized {
            log::debug!("session already initialized, ignoring");
            return;
        }
        self.tour = Some(tour.clone());
        self.rebuild();
        self.initialized = true;
    }

    /// Merge a JSON patch onto the current configuration.
    ///
    /// A malformed patch leaves the prior configuration and index untouched.
    /// A successful merge triggers a full rebuild.
    pub fn update_config(&mut self, patch: &Value) -> Result<(), ConfigError> {
        let merged = config::merge(&self.config, patch)?;
        self.config = merged;
        if self.initialized {
            self.rebuild();
        }
        Ok(())
    }

    /// Decorate records with externally fetched business data.
    ///
    /// `generation` is the value of [`SearchSession::generation`] at the time
    /// the feed was requested. A rebuild in between bumps the counter and the
    /// stale decoration is dropped.
    pub fn apply_business_data(
        &mut self,
        feed: &[BusinessData],
        generation: u64,
    ) -> Option<MergeStats> {
        if generation != self.generation {
            log::debug!(
                "dropping stale business data (generation {generation}, current {})",
                self.generation
            );
            return None;
        }
        let stats = decorate_records(&mut self.records, feed);
        self.report.business_matched = stats.matched;
        self.report.business_unmatched = stats.unmatched;
        self.rebuild_engine();
        Some(stats)
    }

    /// Execute one query term.
    ///
    /// An engine failure comes back as [`SearchOutcome::Failed`] and the
    /// engine is reconstructed empty so subsequent queries return cleanly
    /// instead of failing again.
    pub fn search(&mut self, term: &str) -> SearchOutcome {
        let outcome = self.query.search(term);
        if outcome.is_failed() {
            self.records.clear();
            self.rebuild_engine();
        }
        outcome
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current rebuild generation, to be captured before requesting an
    /// external feed and handed back to [`SearchSession::apply_business_data`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn rebuild(&mut self) {
        let (records, report) = match &self.tour {
            Some(tour) => build_index(tour, &self.config),
            None => (Vec::new(), BuildReport::default()),
        };
        self.records = records;
        self.report = report;
        self.generation += 1;
        self.rebuild_engine();
    }

    fn rebuild_engine(&mut self) {
        let engine = WeightedFuzzyEngine::new(self.records.clone(), self.config.matching.clone());
        self.query = QueryEngine::new(Box::new(engine), &self.config);
    }
}
