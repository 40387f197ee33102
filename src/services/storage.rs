use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::models::{CityArea, Event, EventFields, GeoPoint, Sport, UserPatch, UserProfile};

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AppError::NotFound(what),
            other => AppError::StorageFailure(other.to_string()),
        }
    }
}

/// Document storage for events, users, sports and cities
///
/// Implementations only persist; ownership and admin checks happen in the
/// service layer before any mutating call reaches the store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Full snapshot of the events collection
    async fn fetch_events(&self) -> Result<Vec<Event>, StorageError>;

    async fn fetch_event(&self, event_id: &str) -> Result<Option<Event>, StorageError>;

    async fn create_event(&self, fields: EventFields, created_by: &str) -> Result<Event, StorageError>;

    /// Overwrite the editable fields and stamp `updatedAt`
    async fn update_event(&self, event_id: &str, fields: EventFields) -> Result<Event, StorageError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), StorageError>;

    /// Add `user_id` to the event's members with union semantics
    async fn join_event(&self, event_id: &str, user_id: &str) -> Result<(), StorageError>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError>;

    /// Merge the patch into the user document, creating it if needed
    async fn merge_user(&self, user_id: &str, patch: UserPatch) -> Result<UserProfile, StorageError>;

    async fn list_sports(&self) -> Result<Vec<Sport>, StorageError>;

    async fn add_sport(&self, name: &str) -> Result<Sport, StorageError>;

    async fn delete_sport(&self, sport_id: &str) -> Result<(), StorageError>;

    async fn list_cities(&self) -> Result<Vec<CityArea>, StorageError>;

    async fn add_city(&self, city: &str, area: &str, location: GeoPoint) -> Result<CityArea, StorageError>;

    async fn delete_city(&self, city_id: &str) -> Result<(), StorageError>;

    /// The stored record for an exact city/area pair
    async fn find_city_area(&self, city: &str, area: &str) -> Result<Option<CityArea>, StorageError>;
}
