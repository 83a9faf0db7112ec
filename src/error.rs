//! Error taxonomy.
//!
//! The propagation policy is deliberately asymmetric: nothing inside the index
//! build (classification, filtering, record emission) is allowed to escape as
//! an error; per-record problems become [`crate::build::BuildReport`] entries.
//! The query and dispatch layers surface terminal failure through explicit
//! result channels ([`crate::query::SearchOutcome::Failed`],
//! [`crate::dispatch::ActivationOutcome::Exhausted`]), never through panics or
//! propagated errors.

use thiserror::Error;

/// A host-player call failed or the capability was absent.
///
/// Host errors are always tolerated: callers degrade to "not available" and
/// move on to the next fallback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("host player call failed: {0}")]
pub struct HostError(pub String);

/// Configuration rejected at the update boundary.
///
/// On rejection the prior configuration is retained by the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The patch was not a JSON object.
    #[error("configuration patch must be an object, got {0}")]
    NotAnObject(&'static str),
    /// A field failed range or shape validation after the merge.
    #[error("invalid configuration field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// External data source failure (fetch, parse, or empty payload).
///
/// Recovered by the caller: an empty data set, a logged warning, and search
/// proceeding without enhancement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("failed to parse external data: {0}")]
    Parse(String),
    #[error("external data fetch failed: {0}")]
    Fetch(String),
    #[error("external feed was empty")]
    EmptyFeed,
}

/// The fuzzy-matching engine failed.
///
/// Surfaced to the UI layer as an empty result set with an error indicator;
/// the session reconstructs the engine empty afterwards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("matching engine failure: {0}")]
pub struct EngineError(pub String);

/// Key-value persistence failure (history, feed cache).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("key-value store failure: {0}")]
pub struct StoreError(pub String);
