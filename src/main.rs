use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sports_buddy::config::{Settings, StorageBackend};
use sports_buddy::core::Matcher;
use sports_buddy::error::{handle_json_payload_error, handle_query_payload_error};
use sports_buddy::routes::{self, AppState};
use sports_buddy::services::{
    AppwriteCollections, AppwriteStore, EventService, JwtAuthenticator, MemoryStore, NominatimGeocoder, Storage,
};

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io_error("configuration error", e)
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Sports Buddy service...");

    let storage_timeout = Duration::from_secs(settings.storage.timeout_secs.unwrap_or(30));

    let storage: Arc<dyn Storage> = match settings.storage.backend {
        StorageBackend::Appwrite => {
            let collections = AppwriteCollections {
                events: settings.collection.events.clone(),
                users: settings.collection.users.clone(),
                sports: settings.collection.sports.clone(),
                cities: settings.collection.cities.clone(),
            };

            let store = AppwriteStore::new(
                settings.appwrite.endpoint.clone(),
                settings.appwrite.api_key.clone(),
                settings.appwrite.project_id.clone(),
                settings.appwrite.database_id.clone(),
                collections,
                storage_timeout,
            )
            .map_err(|e| {
                error!("Failed to create Appwrite client: {}", e);
                io_error("storage error", e)
            })?;

            info!("Appwrite store initialized ({})", settings.appwrite.endpoint);
            Arc::new(store)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let geocoder = NominatimGeocoder::new(
        settings.geocoder.endpoint.clone(),
        settings.geocoder.user_agent.clone(),
        Duration::from_secs(settings.geocoder.timeout_secs.unwrap_or(10)),
        settings.geocoder.cache_size.unwrap_or(1000),
        Duration::from_secs(settings.geocoder.cache_ttl_secs.unwrap_or(86_400)),
    )
    .map_err(|e| {
        error!("Failed to create geocoder: {}", e);
        io_error("geocoder error", e)
    })?;

    info!("Geocoder initialized ({})", settings.geocoder.endpoint);

    let matcher = Matcher::new(settings.matching.order);

    info!("Matcher initialized with order: {:?}", matcher.order());

    let auth = JwtAuthenticator::new(&settings.auth.jwt_secret, settings.auth.issuer.as_deref());

    // Build application state
    let app_state = AppState {
        service: EventService::new(storage, Arc::new(geocoder), matcher, settings.auth.admin_email.clone()),
        auth: Arc::new(auth),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
