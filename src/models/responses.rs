use serde::{Deserialize, Serialize};
use crate::models::domain::{Event, EventMatch, UserProfile};

/// Response for the nearby events endpoint
#[derive(Debug, Clone, Serialize)]
pub struct NearbyEventsResponse {
    pub owned: Vec<EventMatch>,
    pub others: Vec<EventMatch>,
    #[serde(rename = "totalEvents")]
    pub total_events: usize,
}

/// Response for the viewer profile endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    #[serde(rename = "needsName")]
    pub needs_name: bool,
    #[serde(rename = "needsPreferences")]
    pub needs_preferences: bool,
}

/// One joined user as shown in the participant list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// An event with its joined users resolved to display names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventParticipants {
    pub event: Event,
    pub participants: Vec<Participant>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
