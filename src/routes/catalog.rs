use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{NewCityRequest, NewSportRequest};
use crate::routes::{AppState, Viewer};

/// Sports, cities and the filter selector values
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/filters", web::get().to(filter_options))
        .route("/sports", web::get().to(list_sports))
        .route("/sports", web::post().to(add_sport))
        .route("/sports/{id}", web::delete().to(delete_sport))
        .route("/cities", web::get().to(list_cities))
        .route("/cities", web::post().to(add_city))
        .route("/cities/{id}", web::delete().to(delete_city));
}

async fn filter_options(state: web::Data<AppState>, _viewer: Viewer) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.service.filter_options().await?))
}

async fn list_sports(state: web::Data<AppState>, _viewer: Viewer) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.service.list_sports().await?))
}

async fn add_sport(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    body: web::Json<NewSportRequest>,
) -> Result<HttpResponse, AppError> {
    let sport = state.service.add_sport(&identity, &body).await?;
    Ok(HttpResponse::Created().json(sport))
}

async fn delete_sport(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.service.delete_sport(&identity, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list_cities(state: web::Data<AppState>, _viewer: Viewer) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.service.list_cities().await?))
}

/// Add city endpoint
///
/// POST /api/v1/cities with `{"city": "...", "area": "..."}`. The pair is
/// geocoded first; a geocoding failure returns 422 and stores nothing.
async fn add_city(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    body: web::Json<NewCityRequest>,
) -> Result<HttpResponse, AppError> {
    let city = state.service.add_city(&identity, &body).await?;
    Ok(HttpResponse::Created().json(city))
}

async fn delete_city(
    state: web::Data<AppState>,
    Viewer(identity): Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.service.delete_city(&identity, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}
