use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::db::RosterError;
use crate::engine::EngineError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    /// Approval refused; carries the ids of the approved reservations
    /// that occupy the slot.
    Conflict {
        message: String,
        conflicting_ids: Vec<i32>,
    },

    DuplicateUser(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            ApiError::DuplicateUser(name) => write!(f, "User already exists: {}", name),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Conflict responses carry the competing ids so clients can show
        // which reservation won the slot.
        if let ApiError::Conflict {
            message,
            conflicting_ids,
        } = &self
        {
            let body = serde_json::json!({
                "success": false,
                "error": message,
                "conflicting_ids": conflicting_ids,
            });
            return (StatusCode::CONFLICT, Json(body)).into_response();
        }

        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict { .. } => unreachable!("handled above"),
            ApiError::DuplicateUser(name) => (
                StatusCode::CONFLICT,
                format!("User already exists: {name}"),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRange => {
                ApiError::ValidationError("Invalid date/time range".to_string())
            }
            EngineError::UnknownMachine(machine) => {
                ApiError::NotFound(format!("Machine {machine} is not in the catalog"))
            }
            EngineError::NotFound(id) => ApiError::not_found("Reservation", id),
            EngineError::Conflict(ids) => ApiError::Conflict {
                message: format!("Overlaps approved reservation(s): {ids:?}"),
                conflicting_ids: ids,
            },
            EngineError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Duplicate(name) => ApiError::DuplicateUser(name),
            RosterError::NotFound(name) => ApiError::not_found("User", name),
            RosterError::Other(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }
}
