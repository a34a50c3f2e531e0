use crate::domain::error::DomainError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// JSON error body `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
        }
    }

    /// Client errors keep the domain message; server errors are logged and
    /// replaced by `context`.
    pub fn from_domain(err: DomainError, context: &str) -> Self {
        let status = match &err {
            DomainError::InvalidInput(_) | DomainError::Parse(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Database(_) | DomainError::Ai(_) | DomainError::Store(_) => {
                error!(error = %err, "{context}");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: context.to_string(),
                };
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Attaches the generic 500 message for an endpoint.
pub trait OrApiError<T> {
    fn or_api(self, context: &str) -> Result<T, ApiError>;
}

impl<T> OrApiError<T> for Result<T, DomainError> {
    fn or_api(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_domain(e, context))
    }
}
