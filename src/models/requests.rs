use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for creating or updating an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventDraft {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub area: String,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM` read as UTC
    #[validate(length(min = 1))]
    pub time: String,
}

impl EventDraft {
    /// Copy with surrounding whitespace stripped from every field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            city: self.city.trim().to_string(),
            area: self.area.trim().to_string(),
            time: self.time.trim().to_string(),
        }
    }
}

/// Body for reporting the viewer's current position
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body for the preference step
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreferencesRequest {
    #[validate(length(min = 1))]
    pub interests: BTreeSet<String>,
    #[serde(rename = "skillLevel")]
    #[validate(length(min = 1))]
    pub skill_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NameRequest {
    #[serde(rename = "fullName")]
    #[validate(length(min = 1))]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSportRequest {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCityRequest {
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub area: String,
}
