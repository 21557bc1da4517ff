//! Unified error types for sitescan.
//!
//! Every variant carries a stable code prefix so the same error reads the
//! same way in logs, MCP responses and HTTP bodies.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the sitemap scanner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Target or sitemap URL could not be parsed.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network failure or non-200 response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Sitemap document could not be parsed.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// Sitemap index references one of its own ancestors.
    #[error("CYCLE_DETECTED: {0}")]
    CycleDetected(String),

    /// Sitemap indexes nest deeper than the configured ceiling.
    #[error("DEPTH_EXCEEDED: {0}")]
    DepthExceeded(String),

    /// Too many sitemap documents fetched for one resolution.
    #[error("FETCH_BUDGET_EXCEEDED: {0}")]
    FetchBudgetExceeded(String),
}

impl Error {
    /// Whether the error is caused by the caller rather than the remote site.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::InvalidUrl(_))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::ParseFailed(msg) => (-32013, msg.clone()),
            Error::CycleDetected(msg) => (-32014, msg.clone()),
            Error::DepthExceeded(msg) => (-32015, msg.clone()),
            Error::FetchBudgetExceeded(msg) => (-32016, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("https://example.com".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("https://example.com"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("https://example.com".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);
    }

    #[test]
    fn test_invalid_input_uses_invalid_params_code() {
        let mcp_err: McpError = Error::InvalidInput("URL is required".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "URL is required");
    }

    #[test]
    fn test_is_input_error() {
        assert!(Error::InvalidUrl("not a url".into()).is_input_error());
        assert!(Error::InvalidInput("".into()).is_input_error());
        assert!(!Error::HttpError("status 404".into()).is_input_error());
        assert!(!Error::CycleDetected("https://a.example/s.xml".into()).is_input_error());
    }
}
