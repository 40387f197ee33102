use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Deserialize;

use crate::core::{
    distance::event_distance,
    filters::{classify_relation, is_included},
};
use crate::error::AppError;
use crate::models::{Event, EventMatch, FilterSelection, MatchResult, UserProfile, ViewerRelation};

/// Order in which matched events are returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrder {
    /// Keep the storage snapshot order
    #[default]
    Snapshot,
    /// Nearest first, unknown distances last
    Distance,
}

/// Included matches split into the viewer's own events and everything else
#[derive(Debug, Clone, Default)]
pub struct NearbyEvents {
    pub owned: Vec<EventMatch>,
    pub others: Vec<EventMatch>,
}

impl NearbyEvents {
    pub fn len(&self) -> usize {
        self.owned.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Nearby event matcher
///
/// Pure function of (viewer, events, filter): computes for every event the
/// distance from the viewer, whether it passes the filters and the viewer's
/// relation to it. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    order: MatchOrder,
}

impl Matcher {
    pub fn new(order: MatchOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Annotate every event with its match result
    ///
    /// Fails with `LocationUnavailable` when the viewer has no location yet.
    /// A single event with a bad location only gets an unknown distance.
    pub fn match_events(
        &self,
        viewer: &UserProfile,
        events: Vec<Event>,
        filter: &FilterSelection,
    ) -> Result<Vec<EventMatch>, AppError> {
        let origin = viewer.location.ok_or(AppError::LocationUnavailable)?;

        let mut matches: Vec<EventMatch> = events
            .into_iter()
            .map(|event| {
                let result = MatchResult {
                    distance_km: event_distance(&origin, &event),
                    viewer_relation: classify_relation(&event, viewer),
                    included: is_included(&event, viewer, filter),
                };
                EventMatch { event, result }
            })
            .collect();

        if self.order == MatchOrder::Distance {
            // Stable sort keeps snapshot order among equal distances
            matches.sort_by(compare_distance);
        }

        Ok(matches)
    }

    /// Match and keep only the included events, split by ownership
    pub fn nearby(
        &self,
        viewer: &UserProfile,
        events: Vec<Event>,
        filter: &FilterSelection,
    ) -> Result<NearbyEvents, AppError> {
        Ok(partition(self.match_events(viewer, events, filter)?))
    }
}

fn compare_distance(a: &EventMatch, b: &EventMatch) -> Ordering {
    match (a.result.distance_km.km(), b.result.distance_km.km()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Drop excluded matches and split the rest into owned and other events
pub fn partition(matches: Vec<EventMatch>) -> NearbyEvents {
    let (owned, others): (Vec<EventMatch>, Vec<EventMatch>) = matches
        .into_iter()
        .filter(|m| m.result.included)
        .partition(|m| m.result.viewer_relation == ViewerRelation::Owner);

    NearbyEvents { owned, others }
}

/// Membership set after the viewer joins; joining twice changes nothing
pub fn join(event: &Event, viewer: &UserProfile) -> BTreeSet<String> {
    let mut joined = event.joined_users.clone();
    joined.insert(viewer.user_id.clone());
    joined
}
