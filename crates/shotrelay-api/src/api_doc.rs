//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shotrelay API",
        version = "0.1.0",
        description = "Screenshot transform-and-relay service: fetches a screenshot by URL, extracts a region of interest, and posts the result to a Telegram chat."
    ),
    paths(
        handlers::health::health_check,
        handlers::process::process_screenshot,
    ),
    tags(
        (name = "health", description = "Connectivity probes"),
        (name = "screenshots", description = "Screenshot processing and relay")
    )
)]
pub struct ApiDoc;
