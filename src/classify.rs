//! Element type classification.
//!
//! Overlay objects arrive in wildly inconsistent shapes, so classification is
//! a strict, ordered precedence chain that stops at the first confident
//! match. Later tiers exist only for when the authoritative signal is absent:
//!
//! 1. `class` discriminant: known class identifiers map 1:1; the generic
//!    hotspot class is disambiguated by capability flags on its `data`
//!    sub-object, then by label heuristics.
//! 2. Structural sniffing: type-distinctive fields (`url`, `video`,
//!    `vertices`/`polygon`) on the overlay or its `data` object.
//! 3. Label pattern table: last resort, ordered substring/equality patterns.
//! 4. Default: [`ElementType::Element`].
//!
//! Classification is total: it never errors and never panics. The accessor
//! vs direct-field distinction from the host side lives entirely in the
//! [`Probe`] adapter, so one lookup path covers both.

use serde_json::Value;

use crate::probe::Probe;
use crate::types::ElementType;
use crate::utils::normalize;

/// Infer a semantic element type from a heterogeneous overlay object.
///
/// `fallback_label` is the label the builder resolved for the overlay; it
/// feeds the hotspot disambiguation heuristics and the pattern table.
pub fn classify(overlay: &Value, fallback_label: &str) -> ElementType {
    let label = normalize(fallback_label);

    if let Some(class) = overlay.get_str("class") {
        if let Some(ty) = classify_by_class(overlay, &class, &label) {
            return ty;
        }
    }

    if let Some(ty) = classify_by_structure(overlay) {
        return ty;
    }

    if let Some(ty) = classify_by_label(&label) {
        return ty;
    }

    ElementType::Element
}

/// Tier 1: map the `class` discriminant to a type.
fn classify_by_class(overlay: &Value, class: &str, label: &str) -> Option<ElementType> {
    // Order matters: "ProjectedImage" contains "Image", "WebFrame" precedes
    // the plain frame check.
    if class.contains("ProjectedImage") {
        return Some(ElementType::ProjectedImage);
    }
    if class.contains("Webframe") || class.contains("WebFrame") {
        return Some(ElementType::Webframe);
    }
    if class.contains("Video") {
        return Some(ElementType::Video);
    }
    if class.contains("Image") {
        return Some(ElementType::Image);
    }
    if class.contains("Text") {
        return Some(ElementType::Text);
    }
    if class.contains("Hotspot") {
        return Some(classify_hotspot(overlay, label));
    }
    None
}

/// Disambiguate the generic hotspot class.
///
/// The `data` sub-object carries boolean capability flags when the authoring
/// tool filled them in; otherwise the label is the only hint left.
fn classify_hotspot(overlay: &Value, label: &str) -> ElementType {
    if let Some(data) = overlay.get_object("data") {
        if data.get_bool("hasPanoramaAction") {
            return ElementType::Hotspot;
        }
        if data.get_bool("hasText") {
            return ElementType::Text;
        }
        if data.get_bool("isPolygon") {
            return ElementType::Polygon;
        }
    }
    if label.contains("polygon") {
        ElementType::Polygon
    } else if label == "image" {
        ElementType::Image
    } else {
        // "info-" labels are hotspots by operator convention; so is
        // everything else that got this far.
        ElementType::Hotspot
    }
}

/// Tier 2: infer from the presence of type-distinctive fields, checked on the
/// overlay itself and on its nested `data` object.
fn classify_by_structure(overlay: &Value) -> Option<ElementType> {
    let data = overlay.get_object("data");
    let either_has = |name: &str| {
        overlay.has(name) || data.as_ref().is_some_and(|d| d.has(name))
    };

    if either_has("url") {
        return Some(ElementType::Webframe);
    }
    if either_has("video") {
        return Some(ElementType::Video);
    }
    if either_has("vertices") || either_has("polygon") {
        return Some(ElementType::Polygon);
    }
    None
}

/// Tier 3: ordered label pattern table.
const LABEL_PATTERNS: &[(&str, ElementType)] = &[
    ("web", ElementType::Webframe),
    ("video", ElementType::Video),
    ("image", ElementType::Image),
    ("text", ElementType::Text),
    ("polygon", ElementType::Polygon),
    ("goto", ElementType::Hotspot),
    ("info", ElementType::Hotspot),
];

fn classify_by_label(label: &str) -> Option<ElementType> {
    if label.is_empty() {
        return None;
    }
    LABEL_PATTERNS
        .iter()
        .find(|(pattern, _)| label.contains(pattern))
        .map(|(_, ty)| *ty)
}

/// Post-classification override: labels following the `info-`/`info_`
/// authoring convention are hotspots regardless of what classification found.
///
/// Applied after the full chain, so it also rewrites structural and
/// pattern-tier results (it never suppresses classification itself).
pub fn apply_label_override(ty: ElementType, label: &str) -> ElementType {
    let label = label.to_lowercase();
    if label.contains("info-") || label.contains("info_") {
        ElementType::Hotspot
    } else {
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_tags_map_directly() {
        let cases = [
            ("FramePanoramaOverlay", ElementType::Element),
            ("WebframePanoramaOverlay", ElementType::Webframe),
            ("VideoPanoramaOverlay", ElementType::Video),
            ("ImagePanoramaOverlay", ElementType::Image),
            ("TextPanoramaOverlay", ElementType::Text),
            ("ProjectedImagePanoramaOverlay", ElementType::ProjectedImage),
        ];
        for (class, expected) in cases {
            let overlay = json!({"class": class});
            assert_eq!(classify(&overlay, ""), expected, "class {class}");
        }
    }

    #[test]
    fn hotspot_class_disambiguated_by_data_flags() {
        let action = json!({"class": "HotspotPanoramaOverlay", "data": {"hasPanoramaAction": true}});
        assert_eq!(classify(&action, "whatever"), ElementType::Hotspot);

        let text = json!({"class": "HotspotPanoramaOverlay", "data": {"hasText": true}});
        assert_eq!(classify(&text, ""), ElementType::Text);

        let polygon = json!({"class": "HotspotPanoramaOverlay", "data": {"isPolygon": true}});
        assert_eq!(classify(&polygon, ""), ElementType::Polygon);
    }

    #[test]
    fn hotspot_class_falls_back_to_label_heuristics() {
        let overlay = json!({"class": "HotspotPanoramaOverlay"});
        assert_eq!(classify(&overlay, "roof polygon"), ElementType::Polygon);
        assert_eq!(classify(&overlay, "Image"), ElementType::Image);
        assert_eq!(classify(&overlay, "info-desk"), ElementType::Hotspot);
        assert_eq!(classify(&overlay, "front door"), ElementType::Hotspot);
    }

    #[test]
    fn structural_sniffing_without_class_tag() {
        assert_eq!(
            classify(&json!({"url": "https://example.com"}), ""),
            ElementType::Webframe
        );
        assert_eq!(classify(&json!({"video": {}}), ""), ElementType::Video);
        assert_eq!(classify(&json!({"vertices": []}), ""), ElementType::Polygon);
        // nested data object counts too
        assert_eq!(
            classify(&json!({"data": {"video": "clip.mp4"}}), ""),
            ElementType::Video
        );
    }

    #[test]
    fn label_patterns_are_the_last_resort() {
        assert_eq!(classify(&json!({}), "Website frame"), ElementType::Webframe);
        assert_eq!(classify(&json!({}), "Intro Video"), ElementType::Video);
        assert_eq!(classify(&json!({}), "goto roof"), ElementType::Hotspot);
        assert_eq!(classify(&json!({}), "floor polygon"), ElementType::Polygon);
    }

    #[test]
    fn unrecognizable_overlays_default_to_element() {
        assert_eq!(classify(&json!({}), ""), ElementType::Element);
        assert_eq!(classify(&json!({"foo": 1}), "mystery"), ElementType::Element);
        assert_eq!(classify(&json!(null), ""), ElementType::Element);
        assert_eq!(classify(&json!([1, 2, 3]), ""), ElementType::Element);
    }

    #[test]
    fn info_override_forces_hotspot() {
        assert_eq!(
            apply_label_override(ElementType::Image, "info-gallery"),
            ElementType::Hotspot
        );
        assert_eq!(
            apply_label_override(ElementType::Text, "INFO_desk"),
            ElementType::Hotspot
        );
        assert_eq!(
            apply_label_override(ElementType::Image, "gallery"),
            ElementType::Image
        );
    }

    #[test]
    fn class_tag_wins_over_structure_and_label() {
        // has a url AND a video class: class tier is authoritative
        let overlay = json!({"class": "VideoPanoramaOverlay", "url": "https://x"});
        assert_eq!(classify(&overlay, "image"), ElementType::Video);
    }
}
