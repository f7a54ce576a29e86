//! Connectivity probe.

use axum::{http::StatusCode, response::IntoResponse, Json};

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up and reachable")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "success",
            "message": "Server up and reachable"
        })),
    )
}
