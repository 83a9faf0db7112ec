//! Fuzzy search over virtual tour content.
//!
//! This crate builds a searchable index from a tour player's content tree
//! (panoramas and their overlay elements), ranks fuzzy matches against it,
//! and dispatches selected results back to the player with retried element
//! activation. The visual overlay, DOM, and network live in the host; this
//! is the engine behind them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌────────────┐    ┌────────────┐
//! │  probe.rs  │───▶│ classify.rs │───▶│ filter.rs  │───▶│  build.rs  │
//! │ (host duck │    │ (overlay →  │    │ (axis      │    │ (playlist  │
//! │  typing)   │    │ ElementType)│    │  policy)   │    │  walk)     │
//! └────────────┘    └─────────────┘    └────────────┘    └─────┬──────┘
//!                                                             │
//!            ┌──────────────┐    ┌────────────┐    ┌──────────▼─────┐
//!            │ dispatch.rs  │◀───│  query.rs  │◀───│   engine.rs    │
//!            │ (navigation, │    │ (routing,  │    │ (weighted      │
//!            │  retry FSM)  │    │  grouping) │    │  fuzzy match)  │
//!            └──────────────┘    └────────────┘    └────────────────┘
//!
//!   session.rs owns the lifecycle; config.rs, external.rs, history.rs,
//!   and scheduler.rs plug in at its seams.
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tourex::{SearchConfig, SearchOutcome, SearchSession};
//!
//! let mut session = SearchSession::new(SearchConfig::default());
//! session.initialize(&tour_json);
//!
//! match session.search("lobby") {
//!     SearchOutcome::Results { groups, .. } => render(groups),
//!     SearchOutcome::ShowHistory => render_history(),
//!     SearchOutcome::TooShort { min } => hint(min),
//!     SearchOutcome::Failed { message } => show_error(message),
//! }
//! ```

// Module declarations
mod build;
mod classify;
mod config;
mod dispatch;
mod engine;
mod error;
mod external;
mod filter;
mod history;
mod probe;
mod query;
mod scheduler;
mod session;
mod types;
mod utils;

// Re-exports for public API
pub use build::{build_index, BuildReport, SkipEntry, SkipReason};
pub use classify::{apply_label_override, classify};
pub use config::{
    merge, DisplayOptions, ExternalOptions, FieldWeights, IncludeOptions, LabelOptions,
    MatchOptions, SearchConfig,
};
pub use dispatch::{
    dispatch, Activation, ActivationMethod, ActivationOutcome, RetryPolicy, Step, TourPlayer,
};
pub use engine::{
    levenshtein_bounded, MatchEngine, WeightedFuzzyEngine, EXACT_MARKER, QUOTE_MARKER,
};
pub use error::{ConfigError, DataError, EngineError, HostError, StoreError};
pub use external::{decorate_records, parse_feed, FeedCache, FeedPhase, MergeStats};
pub use filter::{
    should_include_element, should_include_panorama, AxisFilter, FilterMode, FilterSet,
    IndexAxisFilter,
};
pub use history::{KeyValueStore, MemoryStore, SearchHistory};
pub use probe::Probe;
pub use query::{group_and_sort, QueryEngine, SearchOutcome, WILDCARD};
pub use scheduler::{Scheduler, VirtualScheduler};
pub use session::SearchSession;
pub use types::{
    BusinessData, ElementType, IndexRecord, RecordSource, ResultGroup, ScoredMatch,
    BOOST_ELEMENT, BOOST_LABELED_PANORAMA, BOOST_UNLABELED_PANORAMA,
};
pub use utils::{normalize, truncate_label, LABEL_DISPLAY_LIMIT};
