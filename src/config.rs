//! Configuration surface: a single nested, serde-backed object.
//!
//! Every field has a documented default, so a host can hand over a sparse
//! JSON patch and get predictable behavior. Updates go through
//! [`merge`], a pure function that deep-merges a patch onto a base config
//! and validates the result at the boundary. A malformed patch is rejected
//! whole; the caller keeps its prior configuration. A successful update
//! triggers a full index rebuild (the session's job, not this module's).
//!
//! Merge semantics, per field kind:
//! - objects merge recursively
//! - scalars and arrays replace wholesale (an array patch is never spliced)
//! - `null` entries are ignored (the base value survives)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::RetryPolicy;
use crate::error::ConfigError;
use crate::filter::{AxisFilter, FilterSet};

/// Label-resolution options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelOptions {
    /// Use a panorama's subtitle as its label when the label is empty.
    pub use_subtitles: bool,
    /// Subtitles-only display mode: prefer the subtitle for unlabeled
    /// panoramas even before other fallbacks.
    pub only_subtitles: bool,
    /// Fall back to a tag-joined string for unlabeled panoramas.
    pub tags_as_label: bool,
    /// Skip elements whose resolved label is empty.
    pub skip_empty_labels: bool,
    /// Minimum label length; shorter (non-empty) labels are excluded.
    pub min_label_length: usize,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            use_subtitles: true,
            only_subtitles: false,
            tags_as_label: false,
            skip_empty_labels: false,
            min_label_length: 0,
        }
    }
}

/// Content-inclusion toggles: per-type gates plus the panorama
/// content-completeness flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncludeOptions {
    pub hotspots: bool,
    pub polygons: bool,
    pub videos: bool,
    pub webframes: bool,
    pub images: bool,
    pub text: bool,
    pub projected_images: bool,
    pub elements: bool,
    /// Include panoramas with no label, no subtitle, and no tags.
    pub completely_blank: bool,
    /// Include unlabeled panoramas that have a subtitle.
    pub unlabeled_with_subtitles: bool,
    /// Include unlabeled panoramas that have tags.
    pub unlabeled_with_tags: bool,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        IncludeOptions {
            hotspots: true,
            polygons: true,
            videos: true,
            webframes: true,
            images: true,
            text: true,
            projected_images: true,
            elements: true,
            completely_blank: true,
            unlabeled_with_subtitles: true,
            unlabeled_with_tags: true,
        }
    }
}

impl IncludeOptions {
    /// The final per-type gate. Unrecognized types default to included.
    pub fn allows(&self, element_type: crate::types::ElementType) -> bool {
        use crate::types::ElementType::*;
        match element_type {
            Hotspot => self.hotspots,
            Polygon => self.polygons,
            Video => self.videos,
            Webframe => self.webframes,
            Image => self.images,
            Text => self.text,
            ProjectedImage => self.projected_images,
            Element => self.elements,
            Panorama => true,
        }
    }
}

/// Per-field match weights. Label is authoritative; parent label is a weak
/// association signal, not content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldWeights {
    pub label: f64,
    pub subtitle: f64,
    pub tags: f64,
    pub parent_label: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights {
            label: 1.0,
            subtitle: 0.8,
            tags: 0.6,
            parent_label: 0.3,
        }
    }
}

/// Fuzzy-matching options handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchOptions {
    /// Similarity threshold in `[0, 1]`; weighted field scores below it are
    /// not matches.
    pub threshold: f64,
    pub weights: FieldWeights,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            threshold: 0.4,
            weights: FieldWeights::default(),
        }
    }
}

/// Result-display options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    /// Group matches by element type (off = one flat group).
    pub group_by_type: bool,
    /// Put business-decorated records in a synthetic `Business` group.
    pub business_group: bool,
    /// Post-filter on returned group keys, independent of the per-record
    /// type filters applied at build time.
    pub result_types: AxisFilter,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            group_by_type: true,
            business_group: false,
            result_types: AxisFilter::default(),
        }
    }
}

/// External data options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalOptions {
    /// Cache time-to-live for spreadsheet feeds, seconds.
    pub cache_ttl_secs: u64,
    /// Delay between the coarse and full phases of progressive feed
    /// loading, milliseconds. The host's scheduler owns the timing.
    pub coarse_to_full_delay_ms: u64,
}

impl Default for ExternalOptions {
    fn default() -> Self {
        ExternalOptions {
            cache_ttl_secs: 3600,
            coarse_to_full_delay_ms: 2000,
        }
    }
}

/// The complete configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Minimum query length before a search executes (wildcard exempt).
    pub min_query_length: usize,
    /// Placeholder label for content with nothing else to show.
    pub placeholder_label: String,
    /// Auto-hide the overlay after navigation (passed through to the UI).
    pub auto_hide: bool,
    /// Mobile breakpoint in px (passed through to the UI).
    pub mobile_breakpoint: u32,
    pub labels: LabelOptions,
    pub include: IncludeOptions,
    pub filters: FilterSet,
    pub matching: MatchOptions,
    pub display: DisplayOptions,
    pub retry: RetryPolicy,
    pub external: ExternalOptions,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            min_query_length: 2,
            placeholder_label: "Untitled".to_string(),
            auto_hide: false,
            mobile_breakpoint: 768,
            labels: LabelOptions::default(),
            include: IncludeOptions::default(),
            filters: FilterSet::default(),
            matching: MatchOptions::default(),
            display: DisplayOptions::default(),
            retry: RetryPolicy::default(),
            external: ExternalOptions::default(),
        }
    }
}

impl SearchConfig {
    /// Validate field ranges after a merge. Called by [`merge`]; exposed for
    /// bindings that construct configs programmatically.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_query_length == 0 {
            return Err(ConfigError::Invalid {
                field: "minQueryLength",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.matching.threshold) {
            return Err(ConfigError::Invalid {
                field: "matching.threshold",
                reason: format!("{} is outside [0, 1]", self.matching.threshold),
            });
        }
        let w = &self.matching.weights;
        for (name, value) in [
            ("matching.weights.label", w.label),
            ("matching.weights.subtitle", w.subtitle),
            ("matching.weights.tags", w.tags),
            ("matching.weights.parentLabel", w.parent_label),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field: name,
                    reason: format!("{value} is not a non-negative number"),
                });
            }
        }
        self.retry.validate()?;
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deep-merge `patch` onto `base`: objects recurse, everything else replaces,
/// nulls are ignored.
fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base_slot, patch_value) => *base_slot = patch_value.clone(),
    }
}

/// Merge a JSON patch onto a base configuration.
///
/// Pure: neither input is mutated. Rejects non-object patches at the
/// boundary and validates the merged result; on any error the caller keeps
/// its prior configuration.
pub fn merge(base: &SearchConfig, patch: &Value) -> Result<SearchConfig, ConfigError> {
    if !patch.is_object() {
        return Err(ConfigError::NotAnObject(json_type_name(patch)));
    }

    let mut tree = serde_json::to_value(base).map_err(|e| ConfigError::Invalid {
        field: "<base>",
        reason: e.to_string(),
    })?;
    deep_merge(&mut tree, patch);

    let merged: SearchConfig = serde_json::from_value(tree).map_err(|e| ConfigError::Invalid {
        field: "<patch>",
        reason: e.to_string(),
    })?;
    merged.validate()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn merge_overrides_scalars_and_keeps_the_rest() {
        let base = SearchConfig::default();
        let merged = merge(&base, &json!({"minQueryLength": 3})).unwrap();
        assert_eq!(merged.min_query_length, 3);
        assert_eq!(merged.placeholder_label, base.placeholder_label);
        assert_eq!(merged.matching, base.matching);
    }

    #[test]
    fn merge_recurses_into_nested_objects() {
        let base = SearchConfig::default();
        let merged = merge(
            &base,
            &json!({"matching": {"threshold": 0.6}, "labels": {"skipEmptyLabels": true}}),
        )
        .unwrap();
        assert!((merged.matching.threshold - 0.6).abs() < f64::EPSILON);
        // sibling fields in the patched objects survive
        assert_eq!(merged.matching.weights, base.matching.weights);
        assert!(merged.labels.skip_empty_labels);
        assert_eq!(merged.labels.use_subtitles, base.labels.use_subtitles);
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let base = merge(
            &SearchConfig::default(),
            &json!({"filters": {"elementTypes": {"mode": "whitelist", "values": ["Video", "Image"]}}}),
        )
        .unwrap();
        let merged = merge(
            &base,
            &json!({"filters": {"elementTypes": {"values": ["Hotspot"]}}}),
        )
        .unwrap();
        assert_eq!(merged.filters.element_types.values, vec!["Hotspot"]);
    }

    #[test]
    fn non_object_patches_are_rejected() {
        let base = SearchConfig::default();
        assert!(matches!(
            merge(&base, &json!("nope")),
            Err(ConfigError::NotAnObject("a string"))
        ));
        assert!(matches!(
            merge(&base, &json!([1, 2])),
            Err(ConfigError::NotAnObject("an array"))
        ));
        assert!(matches!(
            merge(&base, &Value::Null),
            Err(ConfigError::NotAnObject("null"))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let base = SearchConfig::default();
        assert!(merge(&base, &json!({"matching": {"threshold": 1.5}})).is_err());
        assert!(merge(&base, &json!({"minQueryLength": 0})).is_err());
    }

    #[test]
    fn null_patch_entries_are_ignored() {
        let base = SearchConfig::default();
        let merged = merge(&base, &json!({"placeholderLabel": null})).unwrap();
        assert_eq!(merged.placeholder_label, base.placeholder_label);
    }

    #[test]
    fn config_round_trips_through_json() {
        let base = SearchConfig::default();
        let tree = serde_json::to_value(&base).unwrap();
        let back: SearchConfig = serde_json::from_value(tree).unwrap();
        assert_eq!(back, base);
    }
}
