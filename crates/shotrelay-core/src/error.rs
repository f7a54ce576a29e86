//! Error types module
//!
//! This module provides the core error types used throughout the shotrelay
//! application. All errors are unified under the `AppError` enum, which can
//! represent parameter, fetch, transform, and delivery failures.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like missing parameters
    Debug,
    /// Warning level - for recoverable issues like upstream hiccups
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FETCH_TIMEOUT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing parameter: {0}")]
    MissingParam(String),

    #[error("Malformed signed URL: {0}")]
    MalformedSignedUrl(String),

    #[error("Upstream network failure: {0}")]
    UpstreamNetwork(String),

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Upstream returned unusable status: {0}")]
    UpstreamStatus(String),

    #[error("Image decode failure: {0}")]
    Decode(String),

    #[error("Invalid extraction geometry: {0}")]
    Geometry(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Relay not configured: {0}")]
    RelayNotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MissingParam(_) => (
            400,
            "MISSING_PARAM",
            false,
            Some("Add the missing query parameter and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedSignedUrl(_) => (
            400,
            "MALFORMED_SIGNED_URL",
            false,
            Some("Request a fresh signed URL from the screenshot provider"),
            false,
            LogLevel::Debug,
        ),
        AppError::UpstreamNetwork(_) => (
            502,
            "FETCH_NETWORK",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamTimeout(_) => (
            504,
            "FETCH_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamStatus(_) => (
            502,
            "FETCH_BAD_STATUS",
            false,
            Some("Check that the screenshot URL is still valid"),
            false,
            LogLevel::Warn,
        ),
        AppError::Decode(_) => (
            422,
            "DECODE_FAILURE",
            false,
            Some("Check that the URL points at an image"),
            false,
            LogLevel::Warn,
        ),
        AppError::Geometry(_) => (
            500,
            "INVALID_GEOMETRY",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        AppError::Delivery(_) => (
            502,
            "DELIVERY_FAILED",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
        AppError::RelayNotConfigured(_) => (
            503,
            "RELAY_NOT_CONFIGURED",
            false,
            Some("Set the relay credentials or use dryRun=1"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingParam(_) => "MissingParam",
            AppError::MalformedSignedUrl(_) => "MalformedSignedUrl",
            AppError::UpstreamNetwork(_) => "UpstreamNetwork",
            AppError::UpstreamTimeout(_) => "UpstreamTimeout",
            AppError::UpstreamStatus(_) => "UpstreamStatus",
            AppError::Decode(_) => "Decode",
            AppError::Geometry(_) => "Geometry",
            AppError::Delivery(_) => "Delivery",
            AppError::RelayNotConfigured(_) => "RelayNotConfigured",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingParam(name) => format!("Missing required parameter: {}", name),
            AppError::MalformedSignedUrl(ref msg) => msg.clone(),
            AppError::UpstreamNetwork(ref msg) => msg.clone(),
            AppError::UpstreamTimeout(ref msg) => msg.clone(),
            AppError::UpstreamStatus(ref msg) => msg.clone(),
            AppError::Decode(ref msg) => msg.clone(),
            AppError::Geometry(_) => "Failed to compute extraction region".to_string(),
            AppError::Delivery(ref msg) => msg.clone(),
            AppError::RelayNotConfigured(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_missing_param() {
        let err = AppError::MissingParam("screenshots".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "MISSING_PARAM");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("screenshots"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_upstream_timeout() {
        let err = AppError::UpstreamTimeout("timed out fetching https://x".to_string());
        assert_eq!(err.http_status_code(), 504);
        assert_eq!(err.error_code(), "FETCH_TIMEOUT");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_relay_not_configured() {
        let err = AppError::RelayNotConfigured("no chat id".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "RELAY_NOT_CONFIGURED");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "no chat id");
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = AppError::Internal("pool exploded".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("root cause");
        let err = AppError::from(source.context("middle layer"));
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
        assert!(details.contains("root cause"));
    }
}
