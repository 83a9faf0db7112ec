//! End-to-end tests over realistic tour content trees.

mod common;

use common::{demo_tour, init_logging, tour_with_overlays, tour_with_panoramas};
use serde_json::json;
use tourex::{
    build_index, AxisFilter, ElementType, SearchConfig, SearchOutcome, SearchSession,
};

#[test]
fn default_config_indexes_every_panorama() {
    let tour = tour_with_panoramas(&["Lobby", "", "Roof"]);
    let (records, report) = build_index(&tour, &SearchConfig::default());
    assert_eq!(report.panoramas_indexed, 3);
    assert_eq!(records[1].label, "Untitled");
    assert_eq!(records[1].original_label, "");
}

#[test]
fn lobby_roof_xyz_walkthrough() {
    init_logging();
    let mut session = SearchSession::new(SearchConfig::default());
    session.initialize(&demo_tour());

    // three panoramas plus the lobby's two overlays
    assert_eq!(session.report().panoramas_indexed, 3);
    assert_eq!(session.report().elements_indexed, 2);

    match session.search("lobby") {
        SearchOutcome::Results { matches, .. } => {
            assert_eq!(matches[0].record.label, "Lobby");
            assert!(matches[0].record.source.is_panorama());
        }
        other => panic!("expected results, got {other:?}"),
    }

    match session.search("roof") {
        SearchOutcome::Results { matches, .. } => {
            assert_eq!(matches[0].record.label, "Roof");
        }
        other => panic!("expected results, got {other:?}"),
    }

    match session.search("xyz") {
        SearchOutcome::Results { matches, groups } => {
            assert!(matches.is_empty());
            assert!(groups.is_empty());
        }
        other => panic!("expected empty results, got {other:?}"),
    }
}

#[test]
fn panorama_action_hotspot_classified_regardless_of_label() {
    let tour = tour_with_overlays(vec![json!({
        "id": "ht-1",
        "class": "HotspotPanoramaOverlay",
        "data": {"label": "video wall", "hasPanoramaAction": true}
    })]);
    let (records, _) = build_index(&tour, &SearchConfig::default());
    let overlay = records.iter().find(|r| !r.source.is_panorama()).unwrap();
    assert_eq!(overlay.element_type, ElementType::Hotspot);
}

#[test]
fn video_whitelist_leaves_panoramas_untouched() {
    let config = {
        let mut c = SearchConfig::default();
        c.filters.element_types = AxisFilter::whitelist(vec!["Video"]);
        c
    };
    let (records, report) = build_index(&demo_tour(), &config);

    assert_eq!(report.panoramas_indexed, 3);
    assert_eq!(report.elements_indexed, 1);
    let elements: Vec<_> = records.iter().filter(|r| !r.source.is_panorama()).collect();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].element_type, ElementType::Video);
}

#[test]
fn search_ranks_boosted_panoramas_above_elements() {
    let tour = json!({
        "playlist": [{
            "media": {
                "id": "pano-0",
                "label": "Garden",
                "overlays": [
                    {"id": "ht-1", "class": "HotspotPanoramaOverlay",
                     "data": {"label": "Garden gate", "hasPanoramaAction": true}}
                ]
            }
        }]
    });
    let mut session = SearchSession::new(SearchConfig::default());
    session.initialize(&tour);
    match session.search("garden") {
        SearchOutcome::Results { matches, .. } => {
            assert!(matches.len() >= 2);
            assert!(matches[0].record.source.is_panorama());
        }
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn grouped_results_put_panoramas_first() {
    let mut session = SearchSession::new(SearchConfig::default());
    session.initialize(&demo_tour());
    match session.search("*") {
        SearchOutcome::Results { groups, .. } => {
            assert_eq!(groups[0].key, "Panorama");
            assert_eq!(groups[0].matches.len(), 3);
        }
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn config_update_round_trip_through_session() {
    let mut session = SearchSession::new(SearchConfig::default());
    session.initialize(&demo_tour());

    session
        .update_config(&json!({"include": {"completelyBlank": false}}))
        .unwrap();
    assert_eq!(session.report().panoramas_indexed, 2);

    // malformed follow-up patch leaves the rebuilt state alone
    assert!(session.update_config(&json!(42)).is_err());
    assert_eq!(session.report().panoramas_indexed, 2);
}

#[test]
fn accented_queries_match_unaccented_labels() {
    let tour = tour_with_panoramas(&["Café Terrace"]);
    let mut session = SearchSession::new(SearchConfig::default());
    session.initialize(&tour);
    match session.search("cafe") {
        SearchOutcome::Results { matches, .. } => {
            assert_eq!(matches[0].record.label, "Café Terrace");
        }
        other => panic!("expected results, got {other:?}"),
    }
}
