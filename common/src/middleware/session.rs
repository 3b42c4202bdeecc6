//! Session key extraction.
//!
//! Handlers that act on behalf of a session take a [`SessionKey`] argument;
//! requests without a usable `x-session-key` header are rejected before the
//! handler runs.

use axum::{
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts},
};

use crate::errors::AppError;

/// Header carrying the caller's session key.
pub static SESSION_KEY_HEADER: HeaderName = HeaderName::from_static("x-session-key");

/// Session key taken from the request headers. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&SESSION_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| SessionKey(v.to_string()))
            .ok_or_else(|| AppError::ConnectionUnavailable("missing x-session-key header".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<SessionKey, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-session-key", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SessionKey::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_header() {
        let key = extract(Some("u1@host:27017")).await.unwrap();
        assert_eq!(key.as_str(), "u1@host:27017");
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_unavailable() {
        assert!(matches!(extract(None).await, Err(AppError::ConnectionUnavailable(_))));
        assert!(matches!(extract(Some("  ")).await, Err(AppError::ConnectionUnavailable(_))));
    }
}
