//! Sports Buddy - nearby sports event matching service
//!
//! The core (`core`) is a pure matcher: given a viewer, a snapshot of events
//! and a filter selection it computes distance, visibility and the viewer's
//! relation for every event. `services` wires it to storage, geocoding and
//! authentication; `routes` exposes it over HTTP.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchOrder, NearbyEvents, distance::haversine_distance};
pub use error::AppError;
pub use models::{Event, EventMatch, FilterSelection, GeoPoint, MatchResult, UserProfile, ViewerRelation};
