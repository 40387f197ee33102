use actix_web::{error, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors surfaced by the matching core and the service layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("viewer location is not known yet")]
    LocationUnavailable,

    #[error("geocoding failed: {0}")]
    GeocodeFailed(String),

    #[error("event {0} has a missing or invalid location")]
    MalformedEventLocation(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("authentication required: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl AppError {
    /// Short machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            AppError::LocationUnavailable => "location_unavailable",
            AppError::GeocodeFailed(_) => "geocode_failed",
            AppError::MalformedEventLocation(_) => "malformed_event_location",
            AppError::StorageFailure(_) => "storage_failure",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "invalid_input",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::LocationUnavailable => StatusCode::CONFLICT,
            AppError::GeocodeFailed(_) | AppError::MalformedEventLocation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StorageFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid query: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::LocationUnavailable.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::GeocodeFailed("no results".into()).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::StorageFailure("timeout".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Forbidden("not owner".into()).status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::LocationUnavailable.code(), "location_unavailable");
        assert_eq!(AppError::NotFound("evt".into()).code(), "not_found");
    }
}
