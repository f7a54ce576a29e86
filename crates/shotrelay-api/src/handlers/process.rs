//! Screenshot processing endpoint.
//!
//! Fetch the source image, run the transform chain, then either relay the
//! result to the configured sink or hand it straight back on dry-run.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::{AppState, RelayHandle};
use crate::utils::signed_url::ensure_signed_url_complete;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shotrelay_core::{AppError, Config};
use shotrelay_infra::{OutboundPhoto, PHOTO_CONTENT_TYPE};
use shotrelay_processing::{
    RegionRequest, ScreenshotTransformer, TransformMode, TransformOptions, TransformedImage,
};
use std::sync::Arc;

/// Query parameters, kept as raw strings so invalid numerics can fall back
/// to defaults instead of bouncing the whole request with a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessQuery {
    pub screenshots: Option<String>,
    #[serde(rename = "dryRun")]
    pub dry_run: Option<String>,
    pub pad: Option<String>,
    #[serde(rename = "resizeWidth")]
    pub resize_width: Option<String>,
    #[serde(rename = "box")]
    pub region: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub image_url: String,
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1") | Some("true") | Some("yes"))
}

/// Build transform options from the query, falling back to configured
/// defaults wherever a numeric field does not parse.
fn build_options(query: &ProcessQuery, config: &Config) -> TransformOptions {
    if let Some(raw) = query.region.as_deref() {
        return TransformOptions {
            mode: TransformMode::Manual(RegionRequest::parse(raw)),
            ..TransformOptions::default()
        };
    }

    let padding = query
        .pad
        .as_deref()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(config.pad_pixels);
    let resize_width = query
        .resize_width
        .as_deref()
        .and_then(|value| value.trim().parse::<u32>().ok());

    TransformOptions {
        mode: TransformMode::Auto,
        trim_threshold: config.trim_threshold,
        padding,
        resize_width,
    }
}

/// Decide where the finished image goes. Dry-run always short-circuits to
/// the caller, so a missing relay config never blocks pipeline testing.
fn resolve_relay<'a>(
    dry_run: bool,
    relay: Option<&'a RelayHandle>,
) -> Result<Option<&'a RelayHandle>, AppError> {
    if dry_run {
        return Ok(None);
    }
    match relay {
        Some(handle) => Ok(Some(handle)),
        None => Err(AppError::RelayNotConfigured(
            "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set".to_string(),
        )),
    }
}

fn png_response(image: TransformedImage) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PHOTO_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, image.bytes.len())
        .body(Body::from(image.bytes))
        .map_err(|e| {
            HttpAppError::from(AppError::Internal(format!("Failed to build response: {}", e)))
        })
}

#[utoipa::path(
    get,
    path = "/process-screenshot",
    tag = "screenshots",
    params(
        ("screenshots" = String, Query, description = "URL of the source screenshot"),
        ("dryRun" = Option<String>, Query, description = "When truthy, return the processed PNG instead of relaying it"),
        ("pad" = Option<String>, Query, description = "Auto-mode padding in pixels (default 8)"),
        ("resizeWidth" = Option<String>, Query, description = "Target output width, clamped to [320, 4000]"),
        ("box" = Option<String>, Query, description = "Manual extraction rectangle as left,top,width,height")
    ),
    responses(
        (status = 200, description = "Screenshot processed; JSON receipt, or the PNG itself on dry-run"),
        (status = 400, description = "Missing or malformed input", body = ErrorResponse),
        (status = 422, description = "Source is not a decodable image", body = ErrorResponse),
        (status = 502, description = "Upstream fetch or delivery failed", body = ErrorResponse),
        (status = 503, description = "Relay not configured", body = ErrorResponse)
    )
)]
pub async fn process_screenshot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProcessQuery>,
) -> Result<Response, HttpAppError> {
    let url = query
        .screenshots
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::MissingParam("screenshots".to_string()))?;

    // Cheap precondition before any network round trip
    ensure_signed_url_complete(url).map_err(HttpAppError::from)?;

    tracing::info!(url = %url, "Processing screenshot");

    let data = state.fetcher.fetch(url).await.map_err(HttpAppError::from)?;

    let options = build_options(&query, &state.config);
    let image = tokio::task::spawn_blocking(move || {
        ScreenshotTransformer::process(&data, &options)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Transform task failed: {}", e)))?
    .map_err(HttpAppError::from)?;

    let dry_run = parse_flag(query.dry_run.as_deref());
    let target = resolve_relay(dry_run, state.relay.as_ref()).map_err(HttpAppError::from)?;

    match target {
        None => {
            tracing::info!(
                width = image.width,
                height = image.height,
                "Dry run, returning image to caller"
            );
            png_response(image)
        }
        Some(handle) => {
            let photo = OutboundPhoto {
                bytes: image.bytes,
                caption: None,
            };
            handle
                .sink
                .deliver(&photo, &handle.chat_id)
                .await
                .map_err(HttpAppError::from)?;

            Ok((
                StatusCode::OK,
                Json(ProcessResponse {
                    status: "success".to_string(),
                    message: "Screenshot processed and delivered".to_string(),
                    image_url: url.to_string(),
                }),
            )
                .into_response())
        }
    }
}
