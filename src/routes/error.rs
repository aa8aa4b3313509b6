// Handler errors and their status codes

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::dashboard::{ActionOutcome, SkipReason};
use crate::error::DashboardError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("An action on this entity is already in progress")]
    Busy,

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Containers can only be selected from the containers tab")]
    WrongTab,

    /// The gateway rejected the call; the banner already carries the same text.
    #[error(transparent)]
    Gateway(#[from] DashboardError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Busy | ApiError::WrongTab => StatusCode::CONFLICT,
            ApiError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({
            "message": self.to_string()
        }));
        (status, body).into_response()
    }
}

/// Completed actions answer 204; skipped ones map to an error status.
pub(super) fn action_status(
    outcome: Result<ActionOutcome, DashboardError>,
) -> Result<StatusCode, ApiError> {
    match outcome? {
        ActionOutcome::Completed => Ok(StatusCode::NO_CONTENT),
        ActionOutcome::Skipped(SkipReason::Pending) => Err(ApiError::Busy),
        ActionOutcome::Skipped(SkipReason::EmptyName) => Err(ApiError::EmptyName),
    }
}
