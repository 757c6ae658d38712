mod common;

use common::{MACKENZIE_ROAD_LENGTH, UnreachableStore, YISHUN_AVENUE_2_LENGTH, sample_network, sample_store};
use floodway_core::prelude::*;

#[test]
fn missing_ids_are_skipped() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let results = resolver.resolve_many(&[1, 12, 999_999]).unwrap();
    assert_eq!(results.len(), 2);

    let yishun = &results[0];
    assert_eq!(yishun.flood_id, Some(1));
    assert_eq!(yishun.road_name.as_deref(), Some("Yishun Avenue 2"));
    assert_eq!(yishun.road_type.as_deref(), Some("primary"));
    assert_eq!(yishun.length_m, YISHUN_AVENUE_2_LENGTH);
    assert_eq!(yishun.time_min("50"), Some(0.74));
    assert_eq!(yishun.time_min("20"), Some(1.85));
    assert_eq!(yishun.travel_delay_min(), Some(1.11));

    let mackenzie = &results[1];
    assert_eq!(mackenzie.flood_id, Some(12));
    assert_eq!(mackenzie.road_name.as_deref(), Some("MacKenzie Road"));
    assert_eq!(mackenzie.length_m, MACKENZIE_ROAD_LENGTH);
    assert_eq!(mackenzie.time_min("50"), Some(0.31));
    assert_eq!(mackenzie.time_min("20"), Some(0.77));
    assert_eq!(mackenzie.travel_delay_min(), Some(0.46));
}

#[test]
fn fallback_geometry_is_reported_as_wkt() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let results = resolver.resolve_many(&[12, 1]).unwrap();
    assert_eq!(
        results[0].geometry.as_deref(),
        Some("LINESTRING(103.8484492 1.3055518,103.8481111 1.3057976)")
    );
    assert!(results[1].geometry.as_deref().unwrap().starts_with("LINESTRING(103.8350704 1.4248212,"));
}

#[test]
fn skip_reasons_are_visible() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let outcomes: Vec<_> = resolver.resolve_iter(&[13, 1, 999_999]).unwrap().collect();
    assert_eq!(outcomes.len(), 3);

    assert!(matches!(
        &outcomes[0],
        Err(SkipReason::Failed { flood_id: 13, source: Error::InvalidPoint { .. } })
    ));
    assert!(outcomes[1].is_ok());
    assert!(matches!(&outcomes[2], Err(SkipReason::NotFound(999_999))));
    assert_eq!(outcomes[2].as_ref().unwrap_err().flood_id(), 999_999);
}

#[test]
fn duplicate_ids_resolve_once() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let results = resolver.resolve_many(&[12, 1, 12, 1]).unwrap();
    let ids: Vec<_> = results.iter().map(|r| r.flood_id).collect();
    assert_eq!(ids, [Some(12), Some(1)]);
}

#[test]
fn no_matches_is_an_empty_result() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    assert!(resolver.resolve_many(&[13, 999_999]).unwrap().is_empty());
    assert!(resolver.resolve_many(&[]).unwrap().is_empty());
}

#[test]
fn unreachable_store_fails_the_batch() {
    let network = sample_network();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &UnreachableStore, &profile);

    assert!(matches!(
        resolver.resolve_many(&[1, 12]),
        Err(Error::UpstreamUnavailable(_))
    ));
}

#[test]
fn json_shape_and_round_trip() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);
    let results = resolver.resolve_many(&[1, 12]).unwrap();

    let json = serde_json::to_value(&results).unwrap();
    let first = json[0].as_object().unwrap();
    for key in [
        "flood_id",
        "road_name",
        "road_type",
        "length_m",
        "time_50kmh_min",
        "time_20kmh_min",
        "time_travel_delay_min",
        "geometry",
    ] {
        assert!(first.contains_key(key), "missing {key}");
    }
    assert_eq!(first["time_travel_delay_min"], 1.11);

    let text = serde_json::to_string(&results).unwrap();
    let parsed: Vec<DelayResult> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, results);
    assert_eq!(parsed[0].length_m.to_bits(), results[0].length_m.to_bits());
    assert_eq!(parsed[1].length_m.to_bits(), results[1].length_m.to_bits());
}

#[test]
fn multiple_degraded_speeds_get_labelled_delays() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::bus_flood();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let results = resolver.resolve_many(&[1]).unwrap();
    let yishun = &results[0];
    assert_eq!(yishun.travel_delay_min(), None);
    assert_eq!(yishun.delay_min("60"), None);
    for label in ["48", "30", "12", "5"] {
        let expected = yishun.time_min(label).unwrap() - yishun.time_min("60").unwrap();
        assert!((yishun.delay_min(label).unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn ad_hoc_point_resolution() {
    let network = sample_network();
    let store = sample_store();
    let profile = SpeedProfile::flood_default();
    let resolver = DelayResolver::new(&network, &store, &profile);

    let result = resolver.resolve_point(None, &QueryPoint::new(1.3601, 103.845)).unwrap();
    assert_eq!(result.flood_id, None);
    assert_eq!(result.road_name.as_deref(), Some("Braddell Road"));

    assert!(matches!(
        resolver.resolve_point(None, &QueryPoint::new(f64::INFINITY, 103.845)),
        Err(Error::InvalidPoint { .. })
    ));
}
