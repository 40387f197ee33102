use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;
use crate::models::time::deserialize_event_time;

/// A point on the globe in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!("latitude out of range: {}", latitude)));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!("longitude out of range: {}", longitude)));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

impl TryFrom<RawLocation> for GeoPoint {
    type Error = AppError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        match (raw.latitude, raw.longitude) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            _ => Err(AppError::Validation("location needs latitude and longitude".into())),
        }
    }
}

/// Location exactly as stored on an event document
///
/// Stored records can lack either coordinate, so both halves are optional
/// and validation happens when the matcher asks for a [`GeoPoint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl From<GeoPoint> for RawLocation {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
        }
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stored viewer location; a half-written or out-of-range one reads as unset
fn lenient_location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLocation>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match GeoPoint::try_from(raw) {
        Ok(point) => Some(point),
        Err(e) => {
            tracing::warn!("Ignoring stored user location: {}", e);
            None
        }
    }))
}

/// A user's stored profile plus the per-request admin flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId", alias = "$id")]
    pub user_id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_location")]
    pub location: Option<GeoPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: BTreeSet<String>,
    #[serde(rename = "skillLevel", default)]
    pub skill_level: Option<String>,
    /// Derived from the authenticated email, never read from storage
    #[serde(rename = "isAdmin", default, skip_deserializing)]
    pub is_admin: bool,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Name shown in participant lists: full name, then email, then the raw id
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
            .to_string()
    }

    /// Whether the one-time preference step is still pending
    pub fn needs_preferences(&self) -> bool {
        !self.is_admin && (self.interests.is_empty() || self.skill_level.is_none())
    }
}

/// Partial user update with merge semantics: `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<BTreeSet<String>>,
    #[serde(rename = "skillLevel", skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
}

impl UserPatch {
    pub fn apply(self, profile: &mut UserProfile) {
        if let Some(full_name) = self.full_name {
            profile.full_name = Some(full_name);
        }
        if let Some(email) = self.email {
            profile.email = Some(email);
        }
        if let Some(location) = self.location {
            profile.location = Some(location);
        }
        if let Some(interests) = self.interests {
            profile.interests = interests;
        }
        if let Some(skill_level) = self.skill_level {
            profile.skill_level = Some(skill_level);
        }
    }
}

/// A sporting event document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventId", alias = "$id")]
    pub event_id: String,
    pub name: String,
    pub category: String,
    pub city: String,
    pub area: String,
    #[serde(deserialize_with = "deserialize_event_time")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "joinedUsers", default, deserialize_with = "null_as_default")]
    pub joined_users: BTreeSet<String>,
    #[serde(rename = "createdAt", alias = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// The event's coordinates, or `MalformedEventLocation` if either is missing or invalid
    pub fn geo_point(&self) -> Result<GeoPoint, AppError> {
        let malformed = || AppError::MalformedEventLocation(self.event_id.clone());
        let raw = self.location.ok_or_else(malformed)?;
        GeoPoint::try_from(raw).map_err(|_| malformed())
    }
}

/// Event fields written on create/update; identity, ownership and membership live elsewhere
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFields {
    pub name: String,
    pub category: String,
    pub city: String,
    pub area: String,
    pub time: DateTime<Utc>,
    pub location: GeoPoint,
}

/// A sport category managed by the admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    #[serde(rename = "sportId", alias = "$id")]
    pub sport_id: String,
    pub name: String,
}

/// A known city/area pair with its geocoded location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityArea {
    #[serde(rename = "cityId", alias = "$id")]
    pub city_id: String,
    pub city: String,
    pub area: String,
    pub location: GeoPoint,
}

/// Transient filter selection; an empty string counts as no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl FilterSelection {
    pub fn city(&self) -> Option<&str> {
        non_empty(&self.city)
    }

    pub fn area(&self) -> Option<&str> {
        non_empty(&self.area)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// How the viewer relates to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewerRelation {
    Owner,
    Joined,
    NotJoined,
}

/// Distance from the viewer to an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Km(f64),
    Unknown,
}

impl Distance {
    pub fn km(&self) -> Option<f64> {
        match self {
            Distance::Km(km) => Some(*km),
            Distance::Unknown => None,
        }
    }

    /// Kilometers rounded to two decimal places
    pub fn rounded(&self) -> Option<f64> {
        self.km().map(|km| (km * 100.0).round() / 100.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Km(km) => write!(f, "{:.2}", km),
            Distance::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.rounded() {
            Some(km) => serializer.serialize_f64(km),
            None => serializer.serialize_str("unknown"),
        }
    }
}

/// Per-event outcome of a matching pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(rename = "distanceKm")]
    pub distance_km: Distance,
    #[serde(rename = "viewerRelation")]
    pub viewer_relation: ViewerRelation,
    pub included: bool,
}

/// An event paired with its match result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMatch {
    pub event: Event,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// Authenticated caller as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerIdentity {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}
