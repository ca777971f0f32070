use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::middleware::logging::{to_response, ApiError};

/// Failure of a service call. Handlers turn it into a JSON error response.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self {
        Self::NotFound(format!("{entity} with id {id}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) | Self::Db(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    /// Internal causes are logged, never sent.
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, logged) = match self {
            Self::Db(err) => (
                "Internal server error".to_string(),
                ApiError::DbError(err.to_string()),
            ),
            Self::Io(err) => (
                "Internal server error".to_string(),
                ApiError::General(format!("Storage error: {err}")),
            ),
            Self::Internal(msg) => ("Internal server error".to_string(), ApiError::General(msg)),
            Self::Unauthorized(msg) => (msg.clone(), ApiError::Unauthorized(msg)),
            Self::Validation(msg) => (msg.clone(), ApiError::ValidationFail(msg)),
            other => {
                let msg = other.to_string();
                (msg.clone(), ApiError::General(msg))
            }
        };

        to_response((status, Json(json!({ "error": message }))), Err(logged))
    }
}
