//! Inclusion/exclusion filtering for panoramas and overlay elements.
//!
//! Every axis is three-valued (`none`, `whitelist`, `blacklist`) and axes
//! combine by logical AND: a record must pass every configured axis. The
//! first failing check short-circuits to exclude.
//!
//! Tag axes use any-match semantics in both modes: a whitelist passes if
//! *any* tag is allowed, a blacklist fails if *any* tag is blacklisted. A
//! record with zero tags under an active tag whitelist is excluded, since it
//! cannot satisfy "any of allowed".

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::ElementType;
use crate::utils::{contains_normalized, normalize};

/// Three-valued filter mode for a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    None,
    Whitelist,
    Blacklist,
}

/// A string-valued filter axis. Values compare after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisFilter {
    pub mode: FilterMode,
    pub values: Vec<String>,
}

impl AxisFilter {
    pub fn whitelist<S: Into<String>>(values: Vec<S>) -> Self {
        AxisFilter {
            mode: FilterMode::Whitelist,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn blacklist<S: Into<String>>(values: Vec<S>) -> Self {
        AxisFilter {
            mode: FilterMode::Blacklist,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn matches_value(&self, candidate: &str) -> bool {
        let candidate = normalize(candidate);
        self.values.iter().any(|v| normalize(v) == candidate)
    }

    /// Exact-membership test (element types, result groups).
    pub fn passes(&self, candidate: &str) -> bool {
        match self.mode {
            FilterMode::None => true,
            FilterMode::Whitelist => self.matches_value(candidate),
            FilterMode::Blacklist => !self.matches_value(candidate),
        }
    }

    fn contains_any_value(&self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        self.values
            .iter()
            .any(|v| !v.trim().is_empty() && contains_normalized(label, v))
    }

    /// Substring-containment test (label axes).
    pub fn passes_substring(&self, label: &str) -> bool {
        match self.mode {
            FilterMode::None => true,
            FilterMode::Whitelist => self.contains_any_value(label),
            FilterMode::Blacklist => !self.contains_any_value(label),
        }
    }

    /// Any-match test over a tag set.
    pub fn passes_any(&self, tags: &[String]) -> bool {
        match self.mode {
            FilterMode::None => true,
            FilterMode::Whitelist => tags.iter().any(|t| self.matches_value(t)),
            FilterMode::Blacklist => !tags.iter().any(|t| self.matches_value(t)),
        }
    }
}

/// An ordinal-valued filter axis (panorama playlist positions).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexAxisFilter {
    pub mode: FilterMode,
    pub values: Vec<usize>,
}

impl IndexAxisFilter {
    pub fn passes(&self, ordinal: usize) -> bool {
        match self.mode {
            FilterMode::None => true,
            FilterMode::Whitelist => self.values.contains(&ordinal),
            FilterMode::Blacklist => !self.values.contains(&ordinal),
        }
    }
}

/// The full set of configured filter axes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// Element type membership axis.
    pub element_types: AxisFilter,
    /// Element label substring axis.
    pub element_labels: AxisFilter,
    /// Tag membership axis (any-match), applied to elements and panoramas.
    pub tags: AxisFilter,
    /// Panorama label/subtitle substring axis.
    pub panorama_values: AxisFilter,
    /// Panorama playlist-ordinal axis.
    pub panorama_indexes: IndexAxisFilter,
}

/// Should an overlay element be included in the index?
///
/// Evaluation order (first failure excludes):
/// 1. empty-label skip and minimum-label-length threshold
/// 2. type axis
/// 3. label axis (only when the label is non-empty)
/// 4. tag axis
/// 5. per-type include flag (defaults true for unrecognized types)
pub fn should_include_element(
    element_type: ElementType,
    label: &str,
    tags: &[String],
    config: &SearchConfig,
) -> bool {
    let label = label.trim();

    if label.is_empty() {
        if config.labels.skip_empty_labels {
            return false;
        }
    } else if label.chars().count() < config.labels.min_label_length {
        return false;
    }

    if !config.filters.element_types.passes(element_type.as_str()) {
        return false;
    }

    if !label.is_empty() && !config.filters.element_labels.passes_substring(label) {
        return false;
    }

    if !config.filters.tags.passes_any(tags) {
        return false;
    }

    config.include.allows(element_type)
}

/// Should a panorama be included in the index?
///
/// Content-completeness gates run first: a panorama with no label, no
/// subtitle and no tags is "completely blank" and needs the
/// `completely_blank` flag; a panorama with no label but a subtitle or tags
/// is gated by the matching `unlabeled_*` flag. The value, ordinal, and tag
/// axes then apply as usual.
pub fn should_include_panorama(
    label: &str,
    subtitle: &str,
    tags: &[String],
    ordinal: usize,
    config: &SearchConfig,
) -> bool {
    let label = label.trim();
    let subtitle = subtitle.trim();

    if label.is_empty() {
        if subtitle.is_empty() && tags.is_empty() {
            if !config.include.completely_blank {
                return false;
            }
        } else if !subtitle.is_empty() {
            if !config.include.unlabeled_with_subtitles {
                return false;
            }
        } else if !config.include.unlabeled_with_tags {
            return false;
        }
    } else if label.chars().count() < config.labels.min_label_length {
        return false;
    }

    if !config.filters.panorama_indexes.passes(ordinal) {
        return false;
    }

    if !label.is_empty() || !subtitle.is_empty() {
        let axis = &config.filters.panorama_values;
        let hit = axis.contains_any_value(label) || axis.contains_any_value(subtitle);
        let ok = match axis.mode {
            FilterMode::None => true,
            // whitelist passes if either field contains an allowed entry
            FilterMode::Whitelist => hit,
            FilterMode::Blacklist => !hit,
        };
        if !ok {
            return false;
        }
    }

    config.filters.tags.passes_any(tags)
}
