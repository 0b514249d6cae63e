use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::SearchError;

const COURT_SERVICE: &str = "Delhi High Court";

/// Error code of a failed response, kept in its extensions for request metrics.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode(pub &'static str);

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    /// The court site refused the request and no fallback was available.
    Blocked(String),

    ValidationError { code: &'static str, message: String },

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::Blocked(msg) => write!(f, "Blocked: {msg}"),
            Self::ValidationError { message, .. } => write!(f, "Validation error: {message}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "not_found"),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    "database_error",
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} website is unreachable. Please try again later"),
                    "network_error",
                )
            }
            Self::Blocked(msg) => {
                tracing::warn!("Court website blocked request: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), "blocked")
            }
            Self::ValidationError { code, message } => {
                (StatusCode::BAD_REQUEST, message.clone(), *code)
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    "internal_error",
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message).with_code(code);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(e) => Self::ValidationError {
                code: e.reason(),
                message: e.to_string(),
            },
            SearchError::Blocked { reason } => Self::Blocked(reason.to_string()),
            SearchError::Unreachable { .. } => Self::ExternalApiError {
                service: COURT_SERVICE.to_string(),
                message: err.to_string(),
            },
            SearchError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            code: "invalid_request",
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
