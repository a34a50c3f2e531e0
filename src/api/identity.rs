use super::error::ApiError;
use crate::application::knowledge_base::DEMO_USER;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

pub const USER_HEADER: &str = "x-user-id";

/// Caller identity from the `x-user-id` header. Sign-in happens upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl Identity {
    /// The caller, or the demo workspace for anonymous requests.
    pub fn or_demo(&self) -> &str {
        self.0.as_deref().unwrap_or(DEMO_USER)
    }

    pub fn required(&self) -> Result<&str, ApiError> {
        self.0.as_deref().ok_or_else(ApiError::unauthenticated)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(Identity(user))
    }
}
