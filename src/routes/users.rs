use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{GeoPoint, LocationRequest, NameRequest, PreferencesRequest, ProfileResponse, UserProfile};
use crate::routes::{AppState, Viewer};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/me", web::get().to(get_profile))
        .route("/me/location", web::put().to(set_location))
        .route("/me/preferences", web::put().to(set_preferences))
        .route("/me/name", web::put().to(set_name));
}

fn profile_response(profile: UserProfile) -> HttpResponse {
    let needs_name = !profile.is_admin && profile.full_name.is_none();
    let needs_preferences = profile.needs_preferences();
    HttpResponse::Ok().json(ProfileResponse {
        profile,
        needs_name,
        needs_preferences,
    })
}

/// Viewer profile, including which onboarding steps are still pending
async fn get_profile(state: web::Data<AppState>, Viewer(identity): Viewer) -> Result<HttpResponse, AppError> {
    let profile = state.service.viewer_profile(&identity).await?;
    Ok(profile_response(profile))
}

async fn set_location(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    body: web::Json<LocationRequest>,
) -> Result<HttpResponse, AppError> {
    let location = GeoPoint::new(body.latitude, body.longitude)?;
    let profile = state.service.set_location(&identity, location).await?;
    Ok(profile_response(profile))
}

async fn set_preferences(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    body: web::Json<PreferencesRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = state.service.set_preferences(&identity, &body).await?;
    Ok(profile_response(profile))
}

async fn set_name(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    body: web::Json<NameRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = state.service.set_full_name(&identity, &body).await?;
    Ok(profile_response(profile))
}
