// Route exports
pub mod catalog;
pub mod events;
pub mod users;

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse, Responder};

use crate::error::AppError;
use crate::models::{HealthResponse, ViewerIdentity};
use crate::services::{bearer_token, Authenticator, EventService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: EventService,
    pub auth: Arc<dyn Authenticator>,
}

/// The authenticated caller, extracted from the bearer token
#[derive(Debug, Clone)]
pub struct Viewer(pub ViewerIdentity);

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Viewer, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Unauthorized("authentication is not configured".into()))?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let token = bearer_token(header)?;

    let identity = state.auth.authenticate(token).map_err(|e| {
        tracing::info!("Rejected token on {}: {}", req.path(), e);
        AppError::from(e)
    })?;

    Ok(Viewer(identity))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(users::configure)
            .configure(events::configure)
            .configure(catalog::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
