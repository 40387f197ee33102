// Service exports
pub mod appwrite;
pub mod auth;
pub mod events;
pub mod geocoder;
pub mod memory;
pub mod storage;

pub use appwrite::{AppwriteCollections, AppwriteStore};
pub use auth::{bearer_token, AuthError, Authenticator, Claims, JwtAuthenticator};
pub use events::EventService;
pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder};
pub use memory::MemoryStore;
pub use storage::{Storage, StorageError};
