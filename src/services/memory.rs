use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{CityArea, Event, EventFields, GeoPoint, Sport, UserPatch, UserProfile};
use crate::services::storage::{Storage, StorageError};

#[derive(Debug, Default)]
struct Collections {
    // Vecs keep insertion order so snapshots come back the way they went in
    events: Vec<Event>,
    users: HashMap<String, UserProfile>,
    sports: Vec<Sport>,
    cities: Vec<CityArea>,
}

/// In-process document store
///
/// Used for local development (`storage.backend = "memory"`) and tests.
/// Every operation takes the lock once, so joins are atomic unions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event document as-is, e.g. a fixture with a broken location
    pub fn insert_event(&self, event: Event) {
        self.inner.write().events.push(event);
    }

    pub fn insert_user(&self, profile: UserProfile) {
        self.inner.write().users.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn fetch_events(&self) -> Result<Vec<Event>, StorageError> {
        Ok(self.inner.read().events.clone())
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Option<Event>, StorageError> {
        Ok(self.inner.read().events.iter().find(|e| e.event_id == event_id).cloned())
    }

    async fn create_event(&self, fields: EventFields, created_by: &str) -> Result<Event, StorageError> {
        let event = Event {
            event_id: new_id(),
            name: fields.name,
            category: fields.category,
            city: fields.city,
            area: fields.area,
            time: fields.time,
            location: Some(fields.location.into()),
            created_by: created_by.to_string(),
            joined_users: Default::default(),
            created_at: Utc::now(),
            updated_at: None,
        };
        self.inner.write().events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, event_id: &str, fields: EventFields) -> Result<Event, StorageError> {
        let mut inner = self.inner.write();
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| StorageError::NotFound(format!("event {}", event_id)))?;

        event.name = fields.name;
        event.category = fields.category;
        event.city = fields.city;
        event.area = fields.area;
        event.time = fields.time;
        event.location = Some(fields.location.into());
        event.updated_at = Some(Utc::now());

        Ok(event.clone())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let before = inner.events.len();
        inner.events.retain(|e| e.event_id != event_id);
        if inner.events.len() == before {
            return Err(StorageError::NotFound(format!("event {}", event_id)));
        }
        Ok(())
    }

    async fn join_event(&self, event_id: &str, user_id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| StorageError::NotFound(format!("event {}", event_id)))?;
        event.joined_users.insert(user_id.to_string());
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.inner.read().users.get(user_id).cloned())
    }

    async fn merge_user(&self, user_id: &str, patch: UserPatch) -> Result<UserProfile, StorageError> {
        let mut inner = self.inner.write();
        let profile = inner
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        patch.apply(profile);
        Ok(profile.clone())
    }

    async fn list_sports(&self) -> Result<Vec<Sport>, StorageError> {
        Ok(self.inner.read().sports.clone())
    }

    async fn add_sport(&self, name: &str) -> Result<Sport, StorageError> {
        let sport = Sport {
            sport_id: new_id(),
            name: name.to_string(),
        };
        self.inner.write().sports.push(sport.clone());
        Ok(sport)
    }

    async fn delete_sport(&self, sport_id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let before = inner.sports.len();
        inner.sports.retain(|s| s.sport_id != sport_id);
        if inner.sports.len() == before {
            return Err(StorageError::NotFound(format!("sport {}", sport_id)));
        }
        Ok(())
    }

    async fn list_cities(&self) -> Result<Vec<CityArea>, StorageError> {
        Ok(self.inner.read().cities.clone())
    }

    async fn add_city(&self, city: &str, area: &str, location: GeoPoint) -> Result<CityArea, StorageError> {
        let record = CityArea {
            city_id: new_id(),
            city: city.to_string(),
            area: area.to_string(),
            location,
        };
        self.inner.write().cities.push(record.clone());
        Ok(record)
    }

    async fn delete_city(&self, city_id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let before = inner.cities.len();
        inner.cities.retain(|c| c.city_id != city_id);
        if inner.cities.len() == before {
            return Err(StorageError::NotFound(format!("city {}", city_id)));
        }
        Ok(())
    }

    async fn find_city_area(&self, city: &str, area: &str) -> Result<Option<CityArea>, StorageError> {
        Ok(self
            .inner
            .read()
            .cities
            .iter()
            .find(|c| c.city == city && c.area == area)
            .cloned())
    }
}
