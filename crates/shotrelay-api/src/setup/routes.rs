//! Route table and middleware stack.

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::health_check))
        .route(
            "/process-screenshot",
            get(handlers::process::process_screenshot),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
