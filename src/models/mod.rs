// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod time;

pub use domain::{
    CityArea, Distance, Event, EventFields, EventMatch, FilterSelection, GeoPoint, MatchResult,
    RawLocation, Sport, UserPatch, UserProfile, ViewerIdentity, ViewerRelation,
};
pub use requests::{EventDraft, LocationRequest, NameRequest, NewCityRequest, NewSportRequest, PreferencesRequest};
pub use responses::{ErrorResponse, EventParticipants, HealthResponse, NearbyEventsResponse, Participant, ProfileResponse};
pub use time::parse_event_time;
