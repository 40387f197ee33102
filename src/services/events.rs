use std::collections::BTreeSet;
use std::sync::Arc;

use validator::Validate;

use crate::core::{authorize, filter_options, is_admin_email, Action, FilterOptions, Matcher, NearbyEvents};
use crate::error::AppError;
use crate::models::{
    parse_event_time, CityArea, Event, EventDraft, EventFields, EventParticipants, FilterSelection, GeoPoint,
    NameRequest, NewCityRequest, NewSportRequest, Participant, PreferencesRequest, Sport, UserPatch, UserProfile,
    ViewerIdentity,
};
use crate::services::geocoder::Geocoder;
use crate::services::storage::Storage;

/// Application service in front of the matcher and the collaborators
///
/// Every operation resolves the viewer's profile first and checks policy
/// before anything is written.
#[derive(Clone)]
pub struct EventService {
    storage: Arc<dyn Storage>,
    geocoder: Arc<dyn Geocoder>,
    matcher: Matcher,
    admin_email: String,
}

impl EventService {
    pub fn new(
        storage: Arc<dyn Storage>,
        geocoder: Arc<dyn Geocoder>,
        matcher: Matcher,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            geocoder,
            matcher,
            admin_email: admin_email.into(),
        }
    }

    /// The viewer's stored profile with `is_admin` derived from their email
    ///
    /// The first authenticated request creates the user document.
    pub async fn viewer_profile(&self, identity: &ViewerIdentity) -> Result<UserProfile, AppError> {
        let stored = self.storage.fetch_user(&identity.user_id).await?;

        let email_patch = || UserPatch {
            email: identity.email.clone(),
            ..UserPatch::default()
        };

        let mut profile = match stored {
            Some(profile) if profile.email.is_some() || identity.email.is_none() => profile,
            Some(_) => {
                tracing::debug!("Recording email for existing user {}", identity.user_id);
                self.storage.merge_user(&identity.user_id, email_patch()).await?
            }
            None => {
                let profile = self.storage.merge_user(&identity.user_id, email_patch()).await?;
                tracing::info!(target: "audit", user = %identity.user_id, "registered user profile");
                profile
            }
        };

        profile.is_admin = is_admin_email(identity.email.as_deref(), &self.admin_email);
        Ok(profile)
    }

    /// Events to show the viewer, split into their own and everyone else's
    pub async fn nearby_events(
        &self,
        identity: &ViewerIdentity,
        filter: &FilterSelection,
    ) -> Result<(NearbyEvents, usize), AppError> {
        let viewer = self.viewer_profile(identity).await?;
        if viewer.location.is_none() {
            return Err(AppError::LocationUnavailable);
        }

        let events = self.storage.fetch_events().await?;
        let total = events.len();
        let nearby = self.matcher.nearby(&viewer, events, filter)?;

        tracing::info!(
            "Returning {} events for user {} (from {} in storage)",
            nearby.len(),
            viewer.user_id,
            total
        );

        Ok((nearby, total))
    }

    pub async fn create_event(&self, identity: &ViewerIdentity, draft: &EventDraft) -> Result<Event, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        let fields = self.resolve_fields(draft).await?;

        let event = self.storage.create_event(fields, &viewer.user_id).await?;

        tracing::info!(target: "audit", user = %viewer.user_id, event = %event.event_id, "created event");
        Ok(event)
    }

    pub async fn update_event(
        &self,
        identity: &ViewerIdentity,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<Event, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        let event = self.load_event(event_id).await?;
        authorize(&viewer, Action::UpdateEvent, Some(&event))?;

        let fields = self.resolve_fields(draft).await?;
        let updated = self.storage.update_event(event_id, fields).await?;

        tracing::info!(target: "audit", user = %viewer.user_id, event = %event_id, "updated event");
        Ok(updated)
    }

    pub async fn delete_event(&self, identity: &ViewerIdentity, event_id: &str) -> Result<(), AppError> {
        let viewer = self.viewer_profile(identity).await?;
        let event = self.load_event(event_id).await?;
        authorize(&viewer, Action::DeleteEvent, Some(&event))?;

        self.storage.delete_event(event_id).await?;

        tracing::info!(target: "audit", user = %viewer.user_id, event = %event_id, "deleted event");
        Ok(())
    }

    /// Join an event; joining again is a no-op
    pub async fn join_event(&self, identity: &ViewerIdentity, event_id: &str) -> Result<Event, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        let mut event = self.load_event(event_id).await?;
        authorize(&viewer, Action::JoinEvent, Some(&event))?;

        if event.joined_users.contains(&viewer.user_id) {
            tracing::debug!("User {} already joined {}", viewer.user_id, event_id);
            return Ok(event);
        }

        self.storage.join_event(event_id, &viewer.user_id).await?;
        event.joined_users = crate::core::join(&event, &viewer);

        tracing::info!(target: "audit", user = %viewer.user_id, event = %event_id, "joined event");
        Ok(event)
    }

    /// Joined users with display names, for the creator or an admin
    pub async fn participants(&self, identity: &ViewerIdentity, event_id: &str) -> Result<Vec<Participant>, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        let event = self.load_event(event_id).await?;
        authorize(&viewer, Action::ViewParticipants, Some(&event))?;

        Ok(self.resolve_participants(&event).await)
    }

    /// Every stored event with its participants, for the admin
    ///
    /// Needs neither a viewer location nor interests; nothing is filtered.
    pub async fn admin_events(&self, identity: &ViewerIdentity) -> Result<Vec<EventParticipants>, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        authorize(&viewer, Action::ViewAllEvents, None)?;

        let events = self.storage.fetch_events().await?;
        let mut views = Vec::with_capacity(events.len());
        for event in events {
            let participants = self.resolve_participants(&event).await;
            views.push(EventParticipants { event, participants });
        }

        tracing::info!("Returning {} events for admin {}", views.len(), viewer.user_id);
        Ok(views)
    }

    pub async fn set_location(&self, identity: &ViewerIdentity, location: GeoPoint) -> Result<UserProfile, AppError> {
        self.merge_viewer(identity, UserPatch {
            location: Some(location),
            ..UserPatch::default()
        })
        .await
    }

    pub async fn set_preferences(
        &self,
        identity: &ViewerIdentity,
        request: &PreferencesRequest,
    ) -> Result<UserProfile, AppError> {
        let interests: BTreeSet<String> = request
            .interests
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request = PreferencesRequest {
            interests,
            skill_level: request.skill_level.trim().to_string(),
        };
        request.validate()?;

        self.merge_viewer(identity, UserPatch {
            interests: Some(request.interests),
            skill_level: Some(request.skill_level),
            ..UserPatch::default()
        })
        .await
    }

    pub async fn set_full_name(&self, identity: &ViewerIdentity, request: &NameRequest) -> Result<UserProfile, AppError> {
        let request = NameRequest {
            full_name: request.full_name.trim().to_string(),
        };
        request.validate()?;

        self.merge_viewer(identity, UserPatch {
            full_name: Some(request.full_name),
            ..UserPatch::default()
        })
        .await
    }

    pub async fn list_sports(&self) -> Result<Vec<Sport>, AppError> {
        Ok(self.storage.list_sports().await?)
    }

    pub async fn add_sport(&self, identity: &ViewerIdentity, request: &NewSportRequest) -> Result<Sport, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        authorize(&viewer, Action::ManageCatalog, None)?;

        let request = NewSportRequest {
            name: request.name.trim().to_string(),
        };
        request.validate()?;

        let sport = self.storage.add_sport(&request.name).await?;
        tracing::info!(target: "audit", user = %viewer.user_id, sport = %sport.name, "added sport");
        Ok(sport)
    }

    pub async fn delete_sport(&self, identity: &ViewerIdentity, sport_id: &str) -> Result<(), AppError> {
        let viewer = self.viewer_profile(identity).await?;
        authorize(&viewer, Action::ManageCatalog, None)?;

        self.storage.delete_sport(sport_id).await?;
        tracing::info!(target: "audit", user = %viewer.user_id, sport = %sport_id, "deleted sport");
        Ok(())
    }

    pub async fn list_cities(&self) -> Result<Vec<CityArea>, AppError> {
        Ok(self.storage.list_cities().await?)
    }

    /// Geocode and store a city/area pair; nothing is written if geocoding fails
    pub async fn add_city(&self, identity: &ViewerIdentity, request: &NewCityRequest) -> Result<CityArea, AppError> {
        let viewer = self.viewer_profile(identity).await?;
        authorize(&viewer, Action::ManageCatalog, None)?;

        let request = NewCityRequest {
            city: request.city.trim().to_string(),
            area: request.area.trim().to_string(),
        };
        request.validate()?;

        let location = self.geocoder.resolve(&request.city, &request.area).await?;
        let record = self.storage.add_city(&request.city, &request.area, location).await?;

        tracing::info!(
            target: "audit",
            user = %viewer.user_id,
            city = %record.city,
            area = %record.area,
            "added city"
        );
        Ok(record)
    }

    pub async fn delete_city(&self, identity: &ViewerIdentity, city_id: &str) -> Result<(), AppError> {
        let viewer = self.viewer_profile(identity).await?;
        authorize(&viewer, Action::ManageCatalog, None)?;

        self.storage.delete_city(city_id).await?;
        tracing::info!(target: "audit", user = %viewer.user_id, city = %city_id, "deleted city");
        Ok(())
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, AppError> {
        let cities = self.storage.list_cities().await?;
        let sports = self.storage.list_sports().await?;
        Ok(filter_options(&cities, &sports))
    }

    async fn merge_viewer(&self, identity: &ViewerIdentity, patch: UserPatch) -> Result<UserProfile, AppError> {
        let mut profile = self.storage.merge_user(&identity.user_id, patch).await?;
        profile.is_admin = is_admin_email(identity.email.as_deref(), &self.admin_email);

        tracing::info!(target: "audit", user = %identity.user_id, "updated profile");
        Ok(profile)
    }

    /// Display names for the joined users; a user that fails to load is rendered, not fatal
    async fn resolve_participants(&self, event: &Event) -> Vec<Participant> {
        let mut participants = Vec::with_capacity(event.joined_users.len());
        for user_id in &event.joined_users {
            let display_name = match self.storage.fetch_user(user_id).await {
                Ok(Some(profile)) => profile.display_name(),
                Ok(None) => user_id.clone(),
                Err(e) => {
                    tracing::warn!("Failed to load participant {}: {}", user_id, e);
                    format!("Unknown User ({})", user_id)
                }
            };
            participants.push(Participant {
                user_id: user_id.clone(),
                display_name,
            });
        }
        participants
    }

    async fn load_event(&self, event_id: &str) -> Result<Event, AppError> {
        self.storage
            .fetch_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {}", event_id)))
    }

    /// Presence checks, time parsing and location lookup for a draft
    async fn resolve_fields(&self, draft: &EventDraft) -> Result<EventFields, AppError> {
        let draft = draft.trimmed();
        draft.validate()?;

        let time = parse_event_time(&draft.time).map_err(AppError::Validation)?;

        let known_sport = self
            .storage
            .list_sports()
            .await?
            .iter()
            .any(|s| s.name == draft.category);
        if !known_sport {
            tracing::warn!("Event category {:?} is not a known sport", draft.category);
        }

        let location = match self.storage.find_city_area(&draft.city, &draft.area).await? {
            Some(record) => record.location,
            None => {
                tracing::debug!("{}, {} not in catalog, geocoding", draft.area, draft.city);
                self.geocoder.resolve(&draft.city, &draft.area).await?
            }
        };

        Ok(EventFields {
            name: draft.name,
            category: draft.category,
            city: draft.city,
            area: draft.area,
            time,
            location,
        })
    }
}
