//! Errors returned by the HTTP surface.
//!
//! MCP tools convert [`sitescan_core::Error`] directly; this type adds the
//! request-level failures that only exist over HTTP and maps everything to
//! a status code and a `{"error": "..."}` body.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitescan_core::Error;

/// Challenge sent with every 401.
pub const AUTH_CHALLENGE: &str = r#"Basic realm="Restricted""#;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(Error::CacheMiss(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text. Input errors are reported without their code prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Core(Error::InvalidInput(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let mut response = (status, Json(json!({ "error": self.message() }))).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_CHALLENGE));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::InvalidInput("URL is required".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::InvalidUrl("not a url".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::CacheMiss("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(Error::HttpError("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_input_message_has_no_prefix() {
        assert_eq!(ApiError::from(Error::InvalidInput("URL is required".into())).message(), "URL is required");
        assert!(ApiError::from(Error::InvalidUrl("x".into())).message().starts_with("INVALID_URL"));
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], AUTH_CHALLENGE);
    }
}
