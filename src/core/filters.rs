use crate::models::{Event, FilterSelection, UserProfile, ViewerRelation};

/// Check the dropdown selections (city, area, category) against an event
#[inline]
pub fn matches_selection(event: &Event, filter: &FilterSelection) -> bool {
    filter.city().map_or(true, |city| event.city == city)
        && filter.area().map_or(true, |area| event.area == area)
        && filter.category().map_or(true, |category| event.category == category)
}

/// Check the viewer's interests against an event's category
///
/// Admins and viewers who skipped the preference step see every category.
#[inline]
pub fn matches_interests(event: &Event, viewer: &UserProfile) -> bool {
    viewer.is_admin || viewer.interests.is_empty() || viewer.interests.contains(&event.category)
}

/// An event is shown only when every predicate holds
#[inline]
pub fn is_included(event: &Event, viewer: &UserProfile, filter: &FilterSelection) -> bool {
    matches_selection(event, filter) && matches_interests(event, viewer)
}

/// Classify how the viewer relates to an event; ownership wins over membership
#[inline]
pub fn classify_relation(event: &Event, viewer: &UserProfile) -> ViewerRelation {
    if event.created_by == viewer.user_id {
        ViewerRelation::Owner
    } else if event.joined_users.contains(&viewer.user_id) {
        ViewerRelation::Joined
    } else {
        ViewerRelation::NotJoined
    }
}
