// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod options;
pub mod policy;

pub use distance::{distance_between, event_distance, haversine_distance, EARTH_RADIUS_KM};
pub use filters::{classify_relation, is_included, matches_interests, matches_selection};
pub use matcher::{join, partition, MatchOrder, Matcher, NearbyEvents};
pub use options::{filter_options, CityAreas, FilterOptions};
pub use policy::{authorize, is_admin_email, Action};
