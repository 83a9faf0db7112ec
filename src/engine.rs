//! The fuzzy-matching engine seam and its default implementation.
//!
//! The query layer only depends on [`MatchEngine`]: records in, ranked
//! matches with scores out. The default [`WeightedFuzzyEngine`] scores each
//! record over four weighted fields (label, subtitle, tags, parent label)
//! and is rebuilt from scratch whenever the index is replaced. A host that
//! ships its own matcher implements the trait and plugs in at the session.
//!
//! # Scoring
//!
//! Per query token, per field: exact equality (1.0) > prefix (0.9) >
//! substring (0.75) > bounded edit distance (graded below 0.75). The field
//! score is weighted by the field's weight, the record score is the minimum
//! over query tokens (every token must match somewhere, i.e. AND semantics),
//! and the record's static boost multiplies in last, clamped to 1.0.
//! Weighted scores below the configured threshold are not matches.

use crate::config::MatchOptions;
use crate::error::EngineError;
use crate::types::{IndexRecord, ScoredMatch};
use crate::utils::normalize;

/// Marker prefix forcing literal (non-fuzzy-tokenized) interpretation.
pub const QUOTE_MARKER: char = '"';
/// Marker prefix requesting exact-field equality instead of fuzzy matching.
pub const EXACT_MARKER: char = '=';

const SCORE_EXACT: f64 = 1.0;
const SCORE_PREFIX: f64 = 0.9;
const SCORE_SUBSTRING: f64 = 0.75;

/// A replaceable fuzzy-matching engine over a built record list.
pub trait MatchEngine {
    /// The raw record list the engine was built over, in build order.
    fn records(&self) -> &[IndexRecord];

    /// Execute a term against the index. The term may carry a
    /// [`QUOTE_MARKER`] or [`EXACT_MARKER`] prefix; anything else is fuzzy.
    fn search(&self, term: &str) -> Result<Vec<ScoredMatch>, EngineError>;
}

/// Normalized field texts for one record, prepared once at build time.
#[derive(Debug, Clone)]
struct PreparedRecord {
    label: String,
    subtitle: String,
    tags: Vec<String>,
    parent_label: String,
}

/// Default weighted fuzzy engine.
#[derive(Debug, Clone)]
pub struct WeightedFuzzyEngine {
    records: Vec<IndexRecord>,
    prepared: Vec<PreparedRecord>,
    options: MatchOptions,
}

impl WeightedFuzzyEngine {
    pub fn new(records: Vec<IndexRecord>, options: MatchOptions) -> Self {
        let prepared = records
            .iter()
            .map(|r| {
                // business decoration adds its name to the searchable label text
                let mut label = normalize(&r.label);
                if let Some(business) = &r.business {
                    let name = normalize(&business.name);
                    if !name.is_empty() && !label.contains(&name) {
                        label.push(' ');
                        label.push_str(&name);
                    }
                }
                PreparedRecord {
                    label,
                    subtitle: normalize(&r.subtitle),
                    tags: r.tags.iter().map(|t| normalize(t)).collect(),
                    parent_label: normalize(r.source.parent_label()),
                }
            })
            .collect();
        WeightedFuzzyEngine {
            records,
            prepared,
            options,
        }
    }

    /// An engine over nothing. Used when index preparation failed and the
    /// engine is reconstructed empty.
    pub fn empty() -> Self {
        WeightedFuzzyEngine::new(Vec::new(), MatchOptions::default())
    }

    fn rank(&self, mut matches: Vec<ScoredMatch>) -> Vec<ScoredMatch> {
        // stable sort keeps build order among equal scores
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches
    }

    fn search_exact(&self, term: &str) -> Vec<ScoredMatch> {
        let term = normalize(term);
        if term.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (record, prepared) in self.records.iter().zip(&self.prepared) {
            let weights = &self.options.weights;
            let score = if prepared.label == term {
                weights.label
            } else if prepared.subtitle == term {
                weights.subtitle
            } else if prepared.tags.iter().any(|t| t == &term) {
                weights.tags
            } else if prepared.parent_label == term {
                weights.parent_label
            } else {
                continue;
            };
            out.push(ScoredMatch {
                record: record.clone(),
                score: (score * record.boost).min(1.0),
            });
        }
        self.rank(out)
    }

    fn search_literal(&self, term: &str) -> Vec<ScoredMatch> {
        let term = normalize(term);
        if term.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (record, prepared) in self.records.iter().zip(&self.prepared) {
            if let Some(raw) = prepared.field_best(&term, &self.options, substring_score) {
                if raw >= self.options.threshold {
                    out.push(ScoredMatch {
                        record: record.clone(),
                        score: (raw * record.boost).min(1.0),
                    });
                }
            }
        }
        self.rank(out)
    }

    fn search_fuzzy(&self, term: &str) -> Vec<ScoredMatch> {
        let term = normalize(term);
        let tokens: Vec<&str> = term.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (record, prepared) in self.records.iter().zip(&self.prepared) {
            // AND semantics: every query token must clear the threshold
            let mut record_score = f64::MAX;
            let mut matched = true;
            for token in &tokens {
                match prepared.field_best(token, &self.options, fuzzy_score) {
                    Some(raw) if raw >= self.options.threshold => {
                        record_score = record_score.min(raw);
                    }
                    _ => {
                        matched = false;
                        break;
                    }
                }
            }
            if matched {
                out.push(ScoredMatch {
                    record: record.clone(),
                    score: (record_score * record.boost).min(1.0),
                });
            }
        }
        self.rank(out)
    }
}

impl PreparedRecord {
    /// Best weighted field score for one query token under a per-field
    /// scoring function, or `None` when no field scored at all.
    fn field_best(
        &self,
        token: &str,
        options: &MatchOptions,
        score_fn: fn(&str, &str) -> f64,
    ) -> Option<f64> {
        let weights = &options.weights;
        let mut best: f64 = 0.0;
        best = best.max(weights.label * score_fn(&self.label, token));
        best = best.max(weights.subtitle * score_fn(&self.subtitle, token));
        for tag in &self.tags {
            best = best.max(weights.tags * score_fn(tag, token));
        }
        best = best.max(weights.parent_label * score_fn(&self.parent_label, token));
        (best > 0.0).then_some(best)
    }
}

impl MatchEngine for WeightedFuzzyEngine {
    fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    fn search(&self, term: &str) -> Result<Vec<ScoredMatch>, EngineError> {
        let term = term.trim();
        if let Some(rest) = term.strip_prefix(EXACT_MARKER) {
            return Ok(self.search_exact(rest));
        }
        if let Some(rest) = term.strip_prefix(QUOTE_MARKER) {
            return Ok(self.search_literal(rest));
        }
        Ok(self.search_fuzzy(term))
    }
}

/// Literal substring score: no tokenization, no edit distance.
fn substring_score(field: &str, token: &str) -> f64 {
    if field.is_empty() {
        0.0
    } else if field == token {
        SCORE_EXACT
    } else if field.contains(token) {
        SCORE_SUBSTRING
    } else {
        0.0
    }
}

/// Fuzzy score for one query token against one field.
fn fuzzy_score(field: &str, token: &str) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    if field == token {
        return SCORE_EXACT;
    }
    if field.starts_with(token) {
        return SCORE_PREFIX;
    }
    if field.contains(token) {
        return SCORE_SUBSTRING;
    }
    // token-level edit distance against each field word
    let mut best = 0.0f64;
    for word in field.split(' ') {
        if word.starts_with(token) {
            best = best.max(SCORE_PREFIX);
            continue;
        }
        let max_edits = max_edits_for(token);
        if let Some(distance) = levenshtein_bounded(word, token, max_edits) {
            let longest = word.chars().count().max(token.chars().count());
            if longest > 0 {
                let similarity = 1.0 - distance as f64 / longest as f64;
                // cap below substring so literal containment always wins
                best = best.max(similarity.min(SCORE_SUBSTRING - 0.05));
            }
        }
    }
    best
}

/// Edit budget by token length: short tokens tolerate one typo, longer two.
fn max_edits_for(token: &str) -> usize {
    if token.chars().count() <= 4 {
        1
    } else {
        2
    }
}

/// Bounded Levenshtein distance with two early-exit paths.
///
/// 1. If the length difference exceeds `max`, return `None` immediately:
///    `|len(a) - len(b)|` is a lower bound on edit distance.
/// 2. If the minimum row value exceeds `max`, abandon the DP early.
///
/// Character counts, not byte lengths, for Unicode correctness.
pub fn levenshtein_bounded(a: &str, b: &str, max: usize) -> Option<usize> {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if (a_len as isize - b_len as isize).unsigned_abs() > max {
        return None;
    }

    let mut dp: Vec<usize> = (0..=b_len).collect();
    for (i, ac) in a.chars().enumerate() {
        let mut prev = dp[0];
        dp[0] = i + 1;
        let mut min_row = dp[0];

        for (j, bc) in b.chars().enumerate() {
            let temp = dp[j + 1];
            let cost = usize::from(ac != bc);
            dp[j + 1] = (dp[j + 1] + 1).min(dp[j] + 1).min(prev + cost);
            prev = temp;
            if dp[j + 1] < min_row {
                min_row = dp[j + 1];
            }
        }

        if min_row > max {
            return None;
        }
    }

    (dp[b_len] <= max).then_some(dp[b_len])
}
