//! The building blocks of a tour search index.
//!
//! These types define how panoramas and overlay elements flatten into uniform
//! searchable records, and what a ranked, grouped result set looks like.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **IndexRecord**: a record belongs to exactly one lifecycle, panorama
//!   (carries a playlist `index`) or element (carries a `parent_index`),
//!   never both. [`RecordSource`] encodes this at the type level rather than
//!   trusting two optional fields to stay mutually exclusive.
//!
//! - **label**: never empty once a record is built. The builder falls back
//!   through placeholder text, joined tags, the type name, and finally a
//!   synthesized `"{type} {parent}.{child}"` label.
//!
//! - **boost**: 1.5 for labeled panoramas, 1.0 for unlabeled panoramas,
//!   0.8 for overlay elements. Ranking bias toward primary content.

use serde::{Deserialize, Serialize};

use crate::utils::truncate_label;

// =============================================================================
// ELEMENT TYPES
// =============================================================================

/// Semantic type of an indexed tour element.
///
/// Open-ended: anything the classifier cannot recognize falls back to
/// [`ElementType::Element`]. Classification never fails, it only degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Panorama,
    Hotspot,
    Polygon,
    Video,
    Webframe,
    Image,
    Text,
    #[serde(rename = "projectedimage")]
    ProjectedImage,
    Element,
}

impl ElementType {
    /// Display name, used for group keys and synthesized labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Panorama => "Panorama",
            ElementType::Hotspot => "Hotspot",
            ElementType::Polygon => "Polygon",
            ElementType::Video => "Video",
            ElementType::Webframe => "Webframe",
            ElementType::Image => "Image",
            ElementType::Text => "Text",
            ElementType::ProjectedImage => "ProjectedImage",
            ElementType::Element => "Element",
        }
    }

    /// Parse a display name back into a type. Unrecognized names map to
    /// `Element`, mirroring the classifier's open-ended fallback.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "panorama" => ElementType::Panorama,
            "hotspot" => ElementType::Hotspot,
            "polygon" => ElementType::Polygon,
            "video" => ElementType::Video,
            "webframe" => ElementType::Webframe,
            "image" => ElementType::Image,
            "text" => ElementType::Text,
            "projectedimage" => ElementType::ProjectedImage,
            _ => ElementType::Element,
        }
    }
}

// =============================================================================
// RECORD SOURCE: the two lifecycles
// =============================================================================

/// Where a record came from: a playlist panorama or an overlay element.
///
/// A panorama record's `index` is its position in the tour's ordered playlist
/// and the stable identity used for navigation. An element record instead
/// points back at its owning panorama for lookup only, no ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum RecordSource {
    #[serde(rename = "panorama")]
    Panorama { index: usize },
    #[serde(rename = "element")]
    Element {
        parent_index: usize,
        parent_label: String,
    },
}

impl RecordSource {
    /// The playlist index navigation should target: the record's own index
    /// for panoramas, the owning panorama's index for elements.
    pub fn target_index(&self) -> usize {
        match self {
            RecordSource::Panorama { index } => *index,
            RecordSource::Element { parent_index, .. } => *parent_index,
        }
    }

    /// Parent label for elements, empty for panoramas. Lowest-weight match
    /// field and the in-group sort tiebreak.
    pub fn parent_label(&self) -> &str {
        match self {
            RecordSource::Panorama { .. } => "",
            RecordSource::Element { parent_label, .. } => parent_label,
        }
    }

    pub fn is_panorama(&self) -> bool {
        matches!(self, RecordSource::Panorama { .. })
    }
}

// =============================================================================
// INDEX RECORDS
// =============================================================================

/// Relevance boost for a panorama record with an explicit label.
pub const BOOST_LABELED_PANORAMA: f64 = 1.5;
/// Relevance boost for a panorama record without an explicit label.
pub const BOOST_UNLABELED_PANORAMA: f64 = 1.0;
/// Relevance boost for an overlay element record.
pub const BOOST_ELEMENT: f64 = 0.8;

/// External business-data decoration merged onto a record by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessData {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    /// Additional searchable/display fields carried verbatim from the feed.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The atomic searchable unit: a normalized, flat view of one panorama or
/// one overlay element.
///
/// Records are immutable once built; the whole index is replaced wholesale on
/// rebuild, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Display label: truncated to 40 chars with ellipsis, never empty.
    pub label: String,
    /// Raw source label, may be empty.
    #[serde(default)]
    pub original_label: String,
    /// Raw subtitle, may be empty.
    #[serde(default)]
    pub subtitle: String,
    /// Ordered tag sequence, may be empty.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub source: RecordSource,
    /// Host-player element identifier for post-navigation triggering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Static relevance multiplier applied alongside the fuzzy score.
    pub boost: f64,
    /// Present only when external business data matched this record's id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessData>,
}

impl IndexRecord {
    /// Build a panorama record. The display label is truncated here so every
    /// construction path honors the 40-char limit.
    pub fn panorama(
        index: usize,
        label: &str,
        original_label: &str,
        subtitle: &str,
        tags: Vec<String>,
        id: Option<String>,
    ) -> Self {
        let boost = if original_label.trim().is_empty() {
            BOOST_UNLABELED_PANORAMA
        } else {
            BOOST_LABELED_PANORAMA
        };
        IndexRecord {
            element_type: ElementType::Panorama,
            label: truncate_label(label),
            original_label: original_label.to_string(),
            subtitle: subtitle.to_string(),
            tags,
            source: RecordSource::Panorama { index },
            id,
            boost,
            business: None,
        }
    }

    /// Build an overlay element record.
    #[allow(clippy::too_many_arguments)]
    pub fn element(
        element_type: ElementType,
        label: &str,
        original_label: &str,
        tags: Vec<String>,
        parent_index: usize,
        parent_label: &str,
        id: Option<String>,
    ) -> Self {
        IndexRecord {
            element_type,
            label: truncate_label(label),
            original_label: original_label.to_string(),
            subtitle: String::new(),
            tags,
            source: RecordSource::Element {
                parent_index,
                parent_label: parent_label.to_string(),
            },
            id,
            boost: BOOST_ELEMENT,
            business: None,
        }
    }

    /// Group key for result display: the type name, or `"Business"` when the
    /// record carries external provenance and business grouping is on.
    pub fn group_key(&self, business_group: bool) -> &str {
        if business_group && self.business.is_some() {
            "Business"
        } else {
            self.element_type.as_str()
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One ranked match: a record plus its similarity score in `[0, 1]`.
///
/// Wildcard matches carry score 0; they are enumerations, not rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub record: IndexRecord,
    pub score: f64,
}

/// A display group of matches sharing a group key (element type or
/// `"Business"`), sorted by normalized label with parent label as tiebreak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup {
    pub key: String,
    pub matches: Vec<ScoredMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panorama_boost_depends_on_label() {
        let labeled = IndexRecord::panorama(0, "Lobby", "Lobby", "", vec![], None);
        let unlabeled = IndexRecord::panorama(1, "Untitled", "", "", vec![], None);
        assert_eq!(labeled.boost, BOOST_LABELED_PANORAMA);
        assert_eq!(unlabeled.boost, BOOST_UNLABELED_PANORAMA);
    }

    #[test]
    fn element_points_back_at_parent() {
        let rec = IndexRecord::element(
            ElementType::Hotspot,
            "Door",
            "Door",
            vec![],
            3,
            "Lobby",
            Some("ht-1".into()),
        );
        assert_eq!(rec.boost, BOOST_ELEMENT);
        assert_eq!(rec.source.target_index(), 3);
        assert_eq!(rec.source.parent_label(), "Lobby");
        assert!(!rec.source.is_panorama());
    }

    #[test]
    fn long_labels_truncate_on_construction() {
        let long = "a".repeat(80);
        let rec = IndexRecord::panorama(0, &long, &long, "", vec![], None);
        assert_eq!(rec.label.chars().count(), 41);
        assert!(rec.label.ends_with('…'));
        // the raw label is preserved untruncated
        assert_eq!(rec.original_label.len(), 80);
    }

    #[test]
    fn group_key_prefers_business_when_decorated() {
        let mut rec = IndexRecord::panorama(0, "Cafe", "Cafe", "", vec![], None);
        assert_eq!(rec.group_key(true), "Panorama");
        rec.business = Some(BusinessData {
            id: "b1".into(),
            name: "Cafe".into(),
            ..BusinessData::default()
        });
        assert_eq!(rec.group_key(true), "Business");
        assert_eq!(rec.group_key(false), "Panorama");
    }

    #[test]
    fn records_round_trip_with_tagged_source() {
        let pano = IndexRecord::panorama(2, "Roof", "Roof", "", vec![], Some("p-2".into()));
        let tree = serde_json::to_value(&pano).unwrap();
        assert_eq!(tree["kind"], "panorama");
        assert_eq!(tree["index"], 2);
        assert!(tree.get("parentIndex").is_none());
        let back: IndexRecord = serde_json::from_value(tree).unwrap();
        assert_eq!(back, pano);

        let elem = IndexRecord::element(
            ElementType::Video,
            "Clip",
            "Clip",
            vec![],
            2,
            "Roof",
            None,
        );
        let tree = serde_json::to_value(&elem).unwrap();
        assert_eq!(tree["kind"], "element");
        assert_eq!(tree["parentIndex"], 2);
        assert!(tree.get("index").is_none());
        let back: IndexRecord = serde_json::from_value(tree).unwrap();
        assert_eq!(back, elem);
    }

    #[test]
    fn element_type_round_trips_names() {
        for ty in [
            ElementType::Panorama,
            ElementType::Hotspot,
            ElementType::Polygon,
            ElementType::Video,
            ElementType::Webframe,
            ElementType::Image,
            ElementType::Text,
            ElementType::ProjectedImage,
            ElementType::Element,
        ] {
            assert_eq!(ElementType::from_name(ty.as_str()), ty);
        }
        assert_eq!(ElementType::from_name("widget"), ElementType::Element);
    }
}
