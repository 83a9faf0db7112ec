//! Shared test fixtures: tour content trees in the host player's JSON shape.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The three-room demo tour: a labeled lobby with two overlays, an unlabeled
/// panorama, and a labeled roof.
pub fn demo_tour() -> Value {
    json!({
        "playlist": [
            {
                "media": {
                    "id": "pano-lobby",
                    "label": "Lobby",
                    "data": {"subtitle": "Ground floor"},
                    "overlays": [
                        {
                            "id": "ht-door",
                            "class": "HotspotPanoramaOverlay",
                            "data": {"label": "Front door", "hasPanoramaAction": true}
                        },
                        {
                            "id": "vid-intro",
                            "class": "VideoPanoramaOverlay",
                            "data": {"label": "Intro clip"}
                        }
                    ]
                }
            },
            {"media": {"id": "pano-mid"}},
            {"media": {"id": "pano-roof", "label": "Roof", "data": {"tags": ["outdoor"]}}}
        ]
    })
}

/// One panorama carrying the given overlays.
pub fn tour_with_overlays(overlays: Vec<Value>) -> Value {
    json!({
        "playlist": [
            {"media": {"id": "pano-0", "label": "Scene", "overlays": overlays}}
        ]
    })
}

/// A playlist of labeled panoramas, no overlays.
pub fn tour_with_panoramas(labels: &[&str]) -> Value {
    let playlist: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| json!({"media": {"id": format!("pano-{i}"), "label": label}}))
        .collect();
    json!({ "playlist": playlist })
}
