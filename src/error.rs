//! API error taxonomy with automatic HTTP status mapping.
//!
//! Validation errors are raised before any store mutation, so they never
//! need rollback; store mutations are single statements.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Bad credentials (401)
    #[error("Invalid username or password")]
    Unauthorized,

    /// Unknown user or expense id (404)
    #[error("{0}")]
    NotFound(String),

    /// Duplicate username (409)
    #[error("Username already exists")]
    Conflict,

    /// Underlying persistence failure (500, logged)
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Password hashing failure (500, logged)
    #[error("Failed to process credentials")]
    Hash(#[source] argon2::password_hash::Error),
}

impl ApiError {
    /// Wrap a store failure, reclassifying a uniqueness-constraint loser
    /// as a conflict. That race is the one concurrency invariant the
    /// system relies on, and SQLite enforces it.
    pub fn store(context: &'static str, source: sqlx::Error) -> Self {
        if source
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation())
        {
            return Self::Conflict;
        }
        Self::Store { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Store { context, source } => {
                tracing::error!("{}: {}", context, source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Hash(source) => {
                tracing::error!("password hashing failed: {}", source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
