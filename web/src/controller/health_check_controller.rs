use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Health {
    status: String,
    timestamp: String,
    uptime_seconds: u64,
}

/// GET whether the server is up and responding
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = Health),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(Health {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: app_state.started_at.elapsed().as_secs(),
        }),
    )
}
