//! Query execution: term routing, grouping, sorting, and the post-filter.
//!
//! The query layer never throws at the UI: outcomes are a closed enum. Empty
//! terms signal "show history" (an external concern), short terms signal
//! "too short" without executing, the wildcard enumerates the whole index,
//! and engine failures surface as [`SearchOutcome::Failed`] with an empty
//! result set; the session then reconstructs the engine empty.

use crate::config::{DisplayOptions, SearchConfig};
use crate::engine::{MatchEngine, EXACT_MARKER, QUOTE_MARKER};
use crate::types::{ResultGroup, ScoredMatch};
use crate::utils::normalize;

/// The wildcard sentinel: match everything, score nothing.
pub const WILDCARD: &str = "*";

/// Result of executing one query term.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Empty term; the UI should show search history instead.
    ShowHistory,
    /// Term below the configured minimum length; no search executed.
    TooShort { min: usize },
    /// Ranked matches (flat, in rank order, or build order for the wildcard)
    /// plus display groups after the post-filter.
    Results {
        matches: Vec<ScoredMatch>,
        groups: Vec<ResultGroup>,
    },
    /// The matching engine failed; empty result set with an error indicator.
    Failed { message: String },
}

impl SearchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SearchOutcome::Failed { .. })
    }
}

/// Wraps a matching engine with term routing and result shaping.
pub struct QueryEngine {
    engine: Box<dyn MatchEngine>,
    min_query_length: usize,
    display: DisplayOptions,
}

impl QueryEngine {
    pub fn new(engine: Box<dyn MatchEngine>, config: &SearchConfig) -> Self {
        QueryEngine {
            engine,
            min_query_length: config.min_query_length,
            display: config.display.clone(),
        }
    }

    /// The records behind the engine, in build order.
    pub fn records(&self) -> &[crate::types::IndexRecord] {
        self.engine.records()
    }

    /// Execute one term.
    pub fn search(&self, term: &str) -> SearchOutcome {
        let term = term.trim();

        if term.is_empty() {
            return SearchOutcome::ShowHistory;
        }

        if term == WILDCARD {
            let matches: Vec<ScoredMatch> = self
                .engine
                .records()
                .iter()
                .map(|record| ScoredMatch {
                    record: record.clone(),
                    score: 0.0,
                })
                .collect();
            let groups = self.grouped(&matches);
            return SearchOutcome::Results { matches, groups };
        }

        if term.chars().count() < self.min_query_length {
            return SearchOutcome::TooShort {
                min: self.min_query_length,
            };
        }

        let routed = route_term(term);
        match self.engine.search(&routed) {
            Ok(matches) => {
                let groups = self.grouped(&matches);
                SearchOutcome::Results { matches, groups }
            }
            Err(e) => {
                log::warn!("matching engine failed for term {term:?}: {e}");
                SearchOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn grouped(&self, matches: &[ScoredMatch]) -> Vec<ResultGroup> {
        group_and_sort(matches, &self.display)
    }
}

/// Quote terms that carry digits, hyphens, or underscores so the engine
/// interprets them literally instead of fuzzy-tokenizing; pass exact-match
/// requests through untouched.
fn route_term(term: &str) -> String {
    if term.starts_with(EXACT_MARKER) || term.starts_with(QUOTE_MARKER) {
        return term.to_string();
    }
    let force_literal = term
        .chars()
        .any(|c| c.is_ascii_digit() || c == '-' || c == '_');
    if force_literal {
        format!("{QUOTE_MARKER}{term}")
    } else {
        term.to_string()
    }
}

/// Group matches by type (or the synthetic `Business` key) and sort each
/// group by normalized label with parent label as tiebreak.
///
/// Deterministic: identical input yields identical group keys and in-group
/// ordering. `Panorama` always leads; remaining groups are ordered by key.
/// The `result_types` axis post-filters whole groups, independent of the
/// per-record filters applied at build time.
pub fn group_and_sort(matches: &[ScoredMatch], display: &DisplayOptions) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();

    for m in matches {
        let key = if display.group_by_type {
            m.record.group_key(display.business_group).to_string()
        } else {
            "Results".to_string()
        };
        if !display.result_types.passes(&key) {
            continue;
        }
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.matches.push(m.clone()),
            None => groups.push(ResultGroup {
                key,
                matches: vec![m.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| {
        let rank = |g: &ResultGroup| (g.key != "Panorama", g.key.clone());
        rank(a).cmp(&rank(b))
    });

    for group in &mut groups {
        group.matches.sort_by(|a, b| {
            let key = |m: &ScoredMatch| {
                (
                    normalize(&m.record.label),
                    normalize(m.record.source.parent_label()),
                )
            };
            key(a).cmp(&key(b))
        });
    }

    groups
}
