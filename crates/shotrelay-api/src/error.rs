//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `.map_err(Into::into)`
//! so they become `HttpAppError` and render consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shotrelay_core::{AppError, ErrorMetadata, LogLevel};
use shotrelay_infra::{FetchError, FetchErrorKind, RelayError};
use shotrelay_processing::TransformError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from shotrelay-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production for security; in non-production, only show details for non-sensitive errors.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<FetchError> for HttpAppError {
    fn from(err: FetchError) -> Self {
        let app = match err.kind() {
            FetchErrorKind::Timeout => AppError::UpstreamTimeout(err.to_string()),
            FetchErrorKind::BadStatus => AppError::UpstreamStatus(err.to_string()),
            FetchErrorKind::Network => AppError::UpstreamNetwork(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<TransformError> for HttpAppError {
    fn from(err: TransformError) -> Self {
        let app = match err {
            TransformError::Decode(msg) => AppError::Decode(msg),
            TransformError::Geometry(msg) => AppError::Geometry(msg),
            TransformError::Encode(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<RelayError> for HttpAppError {
    fn from(err: RelayError) -> Self {
        HttpAppError(AppError::Delivery(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transform_error_decode() {
        let transform_err = TransformError::Decode("not an image".to_string());
        let HttpAppError(app_err) = transform_err.into();
        match app_err {
            AppError::Decode(msg) => assert_eq!(msg, "not an image"),
            _ => panic!("Expected Decode variant"),
        }
    }

    #[test]
    fn test_from_transform_error_geometry() {
        let transform_err = TransformError::Geometry("0x0 region".to_string());
        let HttpAppError(app_err) = transform_err.into();
        match app_err {
            AppError::Geometry(msg) => assert_eq!(msg, "0x0 region"),
            _ => panic!("Expected Geometry variant"),
        }
    }

    #[test]
    fn test_from_relay_error() {
        let relay_err = RelayError::Rejected("chat not found".to_string());
        let HttpAppError(app_err) = relay_err.into();
        match app_err {
            AppError::Delivery(msg) => assert!(msg.contains("chat not found")),
            _ => panic!("Expected Delivery variant"),
        }
    }

    /// Verifies the public error response contract: serialized ErrorResponse has "error",
    /// "code", "recoverable", and optionally "details" / "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Missing required parameter: screenshots".to_string(),
            details: None,
            error_type: Some("MissingParam".to_string()),
            code: "MISSING_PARAM".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert_eq!(
            json.get("code").and_then(|v| v.as_str()),
            Some("MISSING_PARAM")
        );
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert!(json.get("details").is_none());
    }
}
