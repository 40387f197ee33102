// Unit tests for the Sports Buddy matching core

use std::collections::BTreeSet;
use std::f64::consts::PI;

use chrono::Utc;
use sports_buddy::core::{
    distance::{distance_between, haversine_distance, EARTH_RADIUS_KM},
    filters::{classify_relation, is_included},
    matcher::{join, MatchOrder, Matcher},
};
use sports_buddy::models::{Distance, Event, FilterSelection, GeoPoint, UserProfile, ViewerRelation};

fn create_event(id: &str, category: &str, city: &str, area: &str, location: Option<(f64, f64)>) -> Event {
    Event {
        event_id: id.to_string(),
        name: format!("Event {}", id),
        category: category.to_string(),
        city: city.to_string(),
        area: area.to_string(),
        time: Utc::now(),
        location: location.map(|(lat, lon)| GeoPoint::new(lat, lon).unwrap().into()),
        created_by: "organiser".to_string(),
        joined_users: BTreeSet::new(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn create_viewer(interests: &[&str], is_admin: bool) -> UserProfile {
    UserProfile {
        user_id: "viewer".to_string(),
        location: Some(GeoPoint::new(12.9716, 77.5946).unwrap()),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        is_admin,
        ..UserProfile::default()
    }
}

fn sample_events() -> Vec<Event> {
    vec![
        create_event("1", "Cricket", "Bangalore", "Indiranagar", Some((12.9784, 77.6408))),
        create_event("2", "Football", "Bangalore", "Koramangala", Some((12.9352, 77.6245))),
        create_event("3", "Cricket", "Pune", "Baner", Some((18.5590, 73.7868))),
        create_event("4", "Badminton", "Bangalore", "Indiranagar", None),
        create_event("5", "Football", "Pune", "Kothrud", Some((18.5074, 73.8077))),
    ]
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(12.9716, 77.5946, 12.9716, 77.5946);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_haversine_bangalore_to_mumbai() {
    // Roughly 840 km great-circle
    let distance = haversine_distance(12.9716, 77.5946, 19.0760, 72.8777);
    assert!(distance > 820.0 && distance < 860.0, "got {}", distance);
}

#[test]
fn test_haversine_bounds_and_symmetry() {
    let points = [
        (12.9716, 77.5946),
        (-33.8688, 151.2093),
        (51.5074, -0.1278),
        (90.0, 0.0),
        (-90.0, 180.0),
        (0.0, -180.0),
    ];

    for &(lat1, lon1) in &points {
        for &(lat2, lon2) in &points {
            let a = GeoPoint::new(lat1, lon1).unwrap();
            let b = GeoPoint::new(lat2, lon2).unwrap();
            let forward = distance_between(&a, &b);
            let backward = distance_between(&b, &a);

            assert!(forward >= 0.0 && forward <= 2.0 * PI * EARTH_RADIUS_KM);
            assert!((forward - backward).abs() < 1e-6);
        }
    }
}

#[test]
fn test_bangalore_event_at_viewer_location() {
    let matcher = Matcher::default();
    let viewer = create_viewer(&[], false);
    let events = vec![create_event("b", "Cricket", "Bangalore", "MG Road", Some((12.9716, 77.5946)))];

    let result = matcher.match_events(&viewer, events, &FilterSelection::default()).unwrap();

    assert_eq!(result[0].result.distance_km.to_string(), "0.00");
    assert!(result[0].result.included);
    assert_eq!(result[0].result.viewer_relation, ViewerRelation::NotJoined);
}

#[test]
fn test_interest_mismatch_excluded_regardless_of_distance() {
    let matcher = Matcher::default();
    let viewer = create_viewer(&["Football"], false);
    let events = vec![create_event("c", "Cricket", "Bangalore", "MG Road", Some((12.9716, 77.5946)))];

    let result = matcher.match_events(&viewer, events, &FilterSelection::default()).unwrap();

    assert_eq!(result[0].result.distance_km, Distance::Km(0.0));
    assert!(!result[0].result.included);
}

#[test]
fn test_missing_location_still_included() {
    let matcher = Matcher::default();
    let viewer = create_viewer(&["Badminton"], false);
    let events = vec![create_event("4", "Badminton", "Bangalore", "Indiranagar", None)];

    let result = matcher.match_events(&viewer, events, &FilterSelection::default()).unwrap();

    assert_eq!(result[0].result.distance_km, Distance::Unknown);
    assert!(result[0].result.included);
}

#[test]
fn test_admin_without_interests_sees_all_categories() {
    let matcher = Matcher::default();
    let viewer = create_viewer(&[], true);

    let result = matcher.match_events(&viewer, sample_events(), &FilterSelection::default()).unwrap();

    assert!(result.iter().all(|m| m.result.included));
}

#[test]
fn test_additional_filters_never_grow_the_result() {
    let viewer = create_viewer(&["Cricket", "Football"], false);
    let events = sample_events();

    let selections = [
        FilterSelection::default(),
        FilterSelection { city: Some("Bangalore".into()), ..FilterSelection::default() },
        FilterSelection { city: Some("Bangalore".into()), area: Some("Indiranagar".into()), category: None },
        FilterSelection {
            city: Some("Bangalore".into()),
            area: Some("Indiranagar".into()),
            category: Some("Cricket".into()),
        },
    ];

    let included: Vec<BTreeSet<String>> = selections
        .iter()
        .map(|filter| {
            events
                .iter()
                .filter(|e| is_included(e, &viewer, filter))
                .map(|e| e.event_id.clone())
                .collect()
        })
        .collect();

    for pair in included.windows(2) {
        assert!(pair[1].is_subset(&pair[0]), "{:?} is not a subset of {:?}", pair[1], pair[0]);
    }
    assert_eq!(included[3], BTreeSet::from(["1".to_string()]));
}

#[test]
fn test_match_is_repeatable() {
    let matcher = Matcher::new(MatchOrder::Distance);
    let viewer = create_viewer(&["Cricket"], false);
    let filter = FilterSelection { city: Some("Bangalore".into()), ..FilterSelection::default() };

    let events = sample_events();

    let first = matcher.match_events(&viewer, events.clone(), &filter).unwrap();
    let second = matcher.match_events(&viewer, events, &filter).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_relation_is_exactly_one_of_three() {
    let viewer = create_viewer(&[], false);

    for (owner, joined) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut event = create_event("r", "Cricket", "Bangalore", "Indiranagar", None);
        if owner {
            event.created_by = viewer.user_id.clone();
        }
        if joined {
            event.joined_users.insert(viewer.user_id.clone());
        }

        let expected = match (owner, joined) {
            (true, _) => ViewerRelation::Owner,
            (false, true) => ViewerRelation::Joined,
            (false, false) => ViewerRelation::NotJoined,
        };
        assert_eq!(classify_relation(&event, &viewer), expected);
    }
}

#[test]
fn test_join_twice_equals_join_once() {
    let viewer = create_viewer(&[], false);
    let mut event = create_event("j", "Cricket", "Bangalore", "Indiranagar", None);
    event.joined_users.insert("someone-else".to_string());

    let once = join(&event, &viewer);
    let mut after = event.clone();
    after.joined_users = once.clone();

    assert_eq!(join(&after, &viewer), once);
    assert_eq!(once.len(), 2);
}
