// Route exports
pub mod matches;
pub mod profiles;
pub mod saved;

use crate::models::ErrorResponse;
use crate::services::{CofounderError, CofounderService, SavedProfileStore};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use std::sync::Arc;
use validator::ValidationErrors;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CofounderService>,
    pub saved: Arc<dyn SavedProfileStore>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(profiles::configure)
            .configure(saved::configure),
    );
}

impl CofounderError {
    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            CofounderError::NotFound(_) => "not_found",
            CofounderError::Conflict(_) => "conflict",
            CofounderError::InvalidTransition(_) => "invalid_transition",
            CofounderError::Validation(_) => "validation_failed",
            CofounderError::Forbidden(_) => "forbidden",
            CofounderError::Repository(_) => "upstream_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            CofounderError::NotFound(_) => "The requested resource was not found".to_string(),
            CofounderError::Conflict(_) => "The request conflicts with existing data".to_string(),
            CofounderError::InvalidTransition(_) => {
                "The match request can no longer be changed".to_string()
            }
            CofounderError::Validation(problems) => problems.join("; "),
            CofounderError::Forbidden(_) => "You are not allowed to do that".to_string(),
            CofounderError::Repository(_) => "The backend is unavailable, try again later".to_string(),
        }
    }
}

impl ResponseError for CofounderError {
    fn status_code(&self) -> StatusCode {
        match self {
            CofounderError::NotFound(_) => StatusCode::NOT_FOUND,
            CofounderError::Conflict(_) | CofounderError::InvalidTransition(_) => StatusCode::CONFLICT,
            CofounderError::Validation(_) => StatusCode::BAD_REQUEST,
            CofounderError::Forbidden(_) => StatusCode::FORBIDDEN,
            CofounderError::Repository(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::info!("Request rejected: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            status_code: status.as_u16(),
        })
    }
}

/// 400 response for a request DTO that failed `validator` checks
pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}
