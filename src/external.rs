//! External business data: parsing, caching, and record decoration.
//!
//! Business rows arrive from a host-fetched feed, either a JSON array or
//! spreadsheet CSV text. Fetching itself lives behind the host (no network
//! here); this module turns payload text into [`BusinessData`] rows, caches
//! parsed feeds with a TTL, and merges rows onto index records by id.
//!
//! Progressive loading runs the parse twice: a coarse pass keeps only id and
//! name so decoration lands fast, a full pass follows with tags and the
//! remaining columns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataError, StoreError};
use crate::history::KeyValueStore;
use crate::types::{BusinessData, IndexRecord};

/// Which field subset of the feed to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Id and name only.
    Coarse,
    /// Everything: tags and extra columns included.
    Full,
}

/// Outcome of one decoration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Feed rows that decorated a record.
    pub matched: usize,
    /// Feed rows with no record carrying their id. Counted, never turned
    /// into synthetic records.
    pub unmatched: usize,
}

/// Parse a feed payload, auto-detecting JSON versus CSV.
pub fn parse_feed(text: &str, phase: FeedPhase) -> Result<Vec<BusinessData>, DataError> {
    let trimmed = text.trim_start();
    let rows = if trimmed.starts_with('[') {
        parse_json_feed(text)?
    } else {
        parse_csv_feed(text)?
    };
    if rows.is_empty() {
        return Err(DataError::EmptyFeed);
    }
    Ok(match phase {
        FeedPhase::Full => rows,
        FeedPhase::Coarse => rows
            .into_iter()
            .map(|row| BusinessData {
                id: row.id,
                name: row.name,
                ..BusinessData::default()
            })
            .collect(),
    })
}

/// JSON array of row objects. Rows without an id are dropped with a warning.
fn parse_json_feed(text: &str) -> Result<Vec<BusinessData>, DataError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DataError::Parse(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(DataError::Parse("expected a JSON array of rows".to_string()));
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<BusinessData>(item) {
            Ok(row) if !row.id.trim().is_empty() => rows.push(row),
            Ok(_) => log::warn!("business row without an id, dropped"),
            Err(e) => log::warn!("unreadable business row dropped: {e}"),
        }
    }
    Ok(rows)
}

/// Spreadsheet CSV with a header row. Recognized headers are `id`, `name`,
/// and `tags` (comma-separated inside the cell); everything else lands in
/// `extra` keyed by header.
fn parse_csv_feed(text: &str) -> Result<Vec<BusinessData>, DataError> {
    let mut lines = split_csv_records(text).into_iter();
    let header = lines
        .next()
        .ok_or_else(|| DataError::Parse("empty CSV payload".to_string()))?;
    let columns: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    if !columns.iter().any(|c| c == "id") {
        return Err(DataError::Parse("CSV header has no `id` column".to_string()));
    }

    let mut rows = Vec::new();
    for fields in lines {
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut row = BusinessData::default();
        for (i, field) in fields.iter().enumerate() {
            let Some(column) = columns.get(i) else {
                continue;
            };
            let field = field.trim();
            match column.as_str() {
                "id" => row.id = field.to_string(),
                "name" => row.name = field.to_string(),
                "tags" => {
                    row.tags = field
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {
                    if !field.is_empty() {
                        row.extra
                            .insert(column.clone(), Value::String(field.to_string()));
                    }
                }
            }
        }
        if row.id.trim().is_empty() {
            log::warn!("CSV row without an id, dropped");
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Split CSV text into records of fields, honoring quoted fields with
/// embedded commas, newlines, and doubled-quote escapes.
fn split_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(fields);
    }
    records
}

/// Decorate index records with feed rows, matching on record id.
pub fn decorate_records(records: &mut [IndexRecord], feed: &[BusinessData]) -> MergeStats {
    let mut stats = MergeStats::default();
    for row in feed {
        let hit = records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(row.id.as_str()));
        match hit {
            Some(record) => {
                record.business = Some(row.clone());
                stats.matched += 1;
            }
            None => stats.unmatched += 1,
        }
    }
    if stats.unmatched > 0 {
        log::debug!("{} business rows had no matching record", stats.unmatched);
    }
    stats
}

/// A parsed feed plus the moment it was stored, serialized into the
/// key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedFeed {
    fetched_at_secs: u64,
    rows: Vec<BusinessData>,
}

const CACHE_KEY: &str = "tourex.feed";

/// TTL cache for parsed feeds over a [`KeyValueStore`].
///
/// Time is the caller's: `now_secs` comes in explicitly so hosts and tests
/// own the clock.
pub struct FeedCache<S: KeyValueStore> {
    store: S,
    ttl_secs: u64,
}

impl<S: KeyValueStore> FeedCache<S> {
    pub fn new(store: S, ttl_secs: u64) -> Self {
        FeedCache { store, ttl_secs }
    }

    /// The cached rows, if present and fresh. Corrupt or stale payloads
    /// degrade to a miss.
    pub fn load(&self, now_secs: u64) -> Option<Vec<BusinessData>> {
        let payload = match self.store.get(CACHE_KEY) {
            Ok(Some(p)) => p,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("feed cache read failed: {e}");
                return None;
            }
        };
        let cached: CachedFeed = match serde_json::from_str(&payload) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("feed cache payload unreadable: {e}");
                return None;
            }
        };
        if now_secs.saturating_sub(cached.fetched_at_secs) > self.ttl_secs {
            return None;
        }
        Some(cached.rows)
    }

    pub fn save(&mut self, rows: &[BusinessData], now_secs: u64) -> Result<(), StoreError> {
        let cached = CachedFeed {
            fetched_at_secs: now_secs,
            rows: rows.to_vec(),
        };
        let payload =
            serde_json::to_string(&cached).map_err(|e| StoreError(e.to_string()))?;
        self.store.put(CACHE_KEY, &payload)
    }
}
