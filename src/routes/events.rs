use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{EventDraft, FilterSelection, NearbyEventsResponse};
use crate::routes::{AppState, Viewer};

/// Configure all event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/events/nearby", web::get().to(nearby_events))
        .route("/events", web::get().to(admin_events))
        .route("/events", web::post().to(create_event))
        .route("/events/{id}", web::put().to(update_event))
        .route("/events/{id}", web::delete().to(delete_event))
        .route("/events/{id}/join", web::post().to(join_event))
        .route("/events/{id}/participants", web::get().to(participants));
}

/// Nearby events endpoint
///
/// GET /api/v1/events/nearby?city=&area=&category=
///
/// Empty or absent parameters do not constrain the result. Fails with 409
/// until the viewer has reported a location.
async fn nearby_events(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    filter: web::Query<FilterSelection>,
) -> Result<HttpResponse, AppError> {
    tracing::info!("Finding nearby events for user: {}, filter: {:?}", identity.user_id, filter);

    let (nearby, total_events) = state.service.nearby_events(&identity, &filter).await?;

    Ok(HttpResponse::Ok().json(NearbyEventsResponse {
        owned: nearby.owned,
        others: nearby.others,
        total_events,
    }))
}

/// All events endpoint (admin only)
///
/// GET /api/v1/events
///
/// Every stored event with its participants' display names. No location or
/// interest filtering applies.
async fn admin_events(state: web::Data<AppState>, Viewer(identity): Viewer) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.service.admin_events(&identity).await?))
}

/// Create event endpoint
///
/// POST /api/v1/events
///
/// Request body:
/// ```json
/// {
///   "name": "Sunday Cricket",
///   "category": "Cricket",
///   "city": "Bangalore",
///   "area": "Indiranagar",
///   "time": "2025-03-02T07:30"
/// }
/// ```
async fn create_event(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    draft: web::Json<EventDraft>,
) -> Result<HttpResponse, AppError> {
    let event = state.service.create_event(&identity, &draft).await?;
    Ok(HttpResponse::Created().json(event))
}

async fn update_event(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
    draft: web::Json<EventDraft>,
) -> Result<HttpResponse, AppError> {
    let event = state.service.update_event(&identity, &path, &draft).await?;
    Ok(HttpResponse::Ok().json(event))
}

async fn delete_event(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.service.delete_event(&identity, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn join_event(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let event = state.service.join_event(&identity, &path).await?;
    Ok(HttpResponse::Ok().json(event))
}

async fn participants(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let participants = state.service.participants(&identity, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "eventId": path.as_str(),
        "participants": participants,
        "count": participants.len(),
    })))
}
