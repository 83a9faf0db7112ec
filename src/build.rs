//! Index construction: walking the tour content tree.
//!
//! The walk is deliberately paranoid. Tour documents come from authoring
//! tools that disagree about where labels live, whether overlays hang off the
//! media object or the playlist item, and whether a `data` sub-object exists
//! at all. Every per-item and per-overlay problem is isolated: the item is
//! skipped, the skip is recorded in the [`BuildReport`], and the walk
//! continues. Nothing in here aborts a build.
//!
//! The index is rebuilt in full on every (re)initialization or configuration
//! change; records are immutable once built and the index is replaced
//! wholesale, never patched.

use serde::Serialize;
use serde_json::Value;

use crate::classify::{apply_label_override, classify};
use crate::config::SearchConfig;
use crate::filter::{should_include_element, should_include_panorama};
use crate::probe::Probe;
use crate::types::{ElementType, IndexRecord};
use crate::utils::truncate_label;

/// Why an item or overlay did not make it into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Playlist item had no resolvable media object.
    MissingMedia,
    /// Panorama excluded by the filter policy.
    PanoramaFiltered,
    /// Overlay excluded by the filter policy.
    ElementFiltered,
    /// Overlay was not an object or otherwise unreadable.
    MalformedOverlay,
}

/// One recorded skip: which playlist item, which overlay (if any), and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipEntry {
    pub item: usize,
    pub overlay: Option<usize>,
    pub reason: SkipReason,
}

/// Tagged outcome of one build, aggregated from per-record results.
///
/// Tests (and hosts) can assert on skip and failure counts instead of
/// scraping log output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub panoramas_indexed: usize,
    pub elements_indexed: usize,
    pub items_skipped: usize,
    pub overlays_skipped: usize,
    pub skips: Vec<SkipEntry>,
    /// External business rows that matched a record by id.
    pub business_matched: usize,
    /// External business rows with no matching record. Counted, never
    /// fabricated into records.
    pub business_unmatched: usize,
}

impl BuildReport {
    fn skip_item(&mut self, item: usize, reason: SkipReason) {
        self.items_skipped += 1;
        self.skips.push(SkipEntry {
            item,
            overlay: None,
            reason,
        });
    }

    fn skip_overlay(&mut self, item: usize, overlay: usize, reason: SkipReason) {
        self.overlays_skipped += 1;
        self.skips.push(SkipEntry {
            item,
            overlay: Some(overlay),
            reason,
        });
    }
}

/// Build the search index from a tour content tree.
///
/// Walks the ordered playlist, applies the panorama filter policy, emits one
/// panorama record per included item, then discovers and indexes that
/// panorama's overlay elements.
pub fn build_index(tour: &Value, config: &SearchConfig) -> (Vec<IndexRecord>, BuildReport) {
    let mut records = Vec::new();
    let mut report = BuildReport::default();

    let Some(playlist) = tour.get_array("playlist") else {
        log::warn!("tour has no playlist; index will be empty");
        return (records, report);
    };

    for (item_index, item) in playlist.iter().enumerate() {
        build_item(tour, item, item_index, config, &mut records, &mut report);
    }

    log::debug!(
        "index built: {} panoramas, {} elements, {} items skipped, {} overlays skipped",
        report.panoramas_indexed,
        report.elements_indexed,
        report.items_skipped,
        report.overlays_skipped
    );

    (records, report)
}

fn build_item(
    tour: &Value,
    item: &Value,
    item_index: usize,
    config: &SearchConfig,
    records: &mut Vec<IndexRecord>,
    report: &mut BuildReport,
) {
    // media may be a direct field or behind the adapter's accessor path;
    // either way its absence is a skip, not a failure
    let Some(media) = item.get_object("media") else {
        log::warn!("playlist item {item_index} has no media, skipping");
        report.skip_item(item_index, SkipReason::MissingMedia);
        return;
    };

    let data = media.get_object("data");
    let label = resolve_field(&data, &media, "label");
    let subtitle = resolve_field(&data, &media, "subtitle");
    let tags = resolve_tags(&data, &media);

    if !should_include_panorama(&label, &subtitle, &tags, item_index, config) {
        report.skip_item(item_index, SkipReason::PanoramaFiltered);
        return;
    }

    let display = panorama_display_label(&label, &subtitle, &tags, config);
    let id = media.get_str("id");

    records.push(IndexRecord::panorama(
        item_index, &display, &label, &subtitle, tags, id,
    ));
    report.panoramas_indexed += 1;

    for (overlay_index, overlay) in discover_overlays(tour, item, &media).iter().enumerate() {
        build_overlay(
            overlay,
            overlay_index,
            item_index,
            &display,
            config,
            records,
            report,
        );
    }
}

fn build_overlay(
    overlay: &Value,
    overlay_index: usize,
    item_index: usize,
    parent_label: &str,
    config: &SearchConfig,
    records: &mut Vec<IndexRecord>,
    report: &mut BuildReport,
) {
    if !overlay.is_object() {
        report.skip_overlay(item_index, overlay_index, SkipReason::MalformedOverlay);
        return;
    }

    let data = overlay.get_object("data");
    let raw_label = resolve_overlay_label(&data, overlay);
    let tags = resolve_tags(&data, overlay);

    let element_type = apply_label_override(classify(overlay, &raw_label), &raw_label);

    if !should_include_element(element_type, &raw_label, &tags, config) {
        report.skip_overlay(item_index, overlay_index, SkipReason::ElementFiltered);
        return;
    }

    let id = overlay
        .get_str("id")
        .or_else(|| data.as_ref().and_then(|d| d.get_str("id")));

    // synthesize a label when every source came up empty
    let display = if !raw_label.is_empty() {
        raw_label.clone()
    } else if !tags.is_empty() {
        tags.join(", ")
    } else {
        format!("{} {item_index}.{overlay_index}", element_type.as_str())
    };

    records.push(IndexRecord::element(
        element_type,
        &display,
        &raw_label,
        tags,
        item_index,
        parent_label,
        id,
    ));
    report.elements_indexed += 1;
}

/// Display label precedence for a panorama: explicit label, subtitle (in
/// subtitles-only mode, or when subtitles are a configured label source),
/// joined tags, then the configured placeholder or the literal type name.
fn panorama_display_label(
    label: &str,
    subtitle: &str,
    tags: &[String],
    config: &SearchConfig,
) -> String {
    if !label.is_empty() {
        return label.to_string();
    }
    if (config.labels.only_subtitles || config.labels.use_subtitles) && !subtitle.is_empty() {
        return subtitle.to_string();
    }
    if config.labels.tags_as_label && !tags.is_empty() {
        return tags.join(", ");
    }
    if config.placeholder_label.is_empty() {
        ElementType::Panorama.as_str().to_string()
    } else {
        config.placeholder_label.clone()
    }
}

/// Prefer the nested `data` object's field, fall back to the object itself.
fn resolve_field(data: &Option<Value>, object: &Value, name: &str) -> String {
    data.as_ref()
        .and_then(|d| d.get_str(name))
        .or_else(|| object.get_str(name))
        .unwrap_or_default()
}

fn resolve_tags(data: &Option<Value>, object: &Value) -> Vec<String> {
    let from_data = data
        .as_ref()
        .map(|d| d.get_str_array("tags"))
        .unwrap_or_default();
    if from_data.is_empty() {
        object.get_str_array("tags")
    } else {
        from_data
    }
}

/// Overlay label chain: data label, direct label, truncated text content.
fn resolve_overlay_label(data: &Option<Value>, overlay: &Value) -> String {
    if let Some(label) = data.as_ref().and_then(|d| d.get_str("label")) {
        return label;
    }
    if let Some(label) = overlay.get_str("label") {
        return label;
    }
    if let Some(text) = overlay.get_str("text") {
        return truncate_label(&text);
    }
    String::new()
}

/// Overlay discovery: an ordered fallback chain where the first method
/// yielding a non-empty result wins and later methods are not attempted.
///
/// 1. media `overlays` list
/// 2. item-level `overlays` list
/// 3. media `overlaysByTags` map, flattened
/// 4. tour-global `allOverlays`, cross-referenced to this panorama by the
///    media's id
fn discover_overlays(tour: &Value, item: &Value, media: &Value) -> Vec<Value> {
    if let Some(overlays) = media.get_array("overlays") {
        return overlays;
    }

    if let Some(overlays) = item.get_array("overlays") {
        return overlays;
    }

    if let Some(by_tags) = media.get_object("overlaysByTags") {
        if let Value::Object(map) = by_tags {
            let flattened: Vec<Value> = map
                .values()
                .filter_map(|v| v.as_array())
                .flatten()
                .cloned()
                .collect();
            if !flattened.is_empty() {
                return flattened;
            }
        }
    }

    if let Some(all) = tour.get_array("allOverlays") {
        if let Some(media_id) = media.get_str("id") {
            let owned: Vec<Value> = all
                .into_iter()
                .filter(|o| o.get_str("panorama").as_deref() == Some(media_id.as_str()))
                .collect();
            if !owned.is_empty() {
                return owned;
            }
        }
    }

    Vec::new()
}
