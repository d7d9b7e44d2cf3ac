use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

const APP_NAME: &str = "portal_auth_rs";

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ServerStatus {
    message: String,
    status: String,
    environment: String,
    timestamp: String,
    platform: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SystemInfo {
    name: String,
    version: String,
    environment: String,
    platform: String,
    uptime: u64,
    timestamp: String,
    features: Features,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Features {
    authentication: String,
    session: String,
    security: String,
}

fn platform() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// GET whether the server is running and in which environment
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Server is running", body = ServerStatus)
    )
)]
pub async fn status(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(ServerStatus {
        message: format!("{APP_NAME} is running"),
        status: "running".to_string(),
        environment: app_state.config().runtime_env().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        platform: platform(),
    })
}

/// GET build, uptime and enabled features of this server
#[utoipa::path(
    get,
    path = "/api/system/info",
    responses(
        (status = 200, description = "System information", body = SystemInfo)
    )
)]
pub async fn system_info(State(app_state): State<AppState>) -> impl IntoResponse {
    let config = app_state.config();
    Json(SystemInfo {
        name: APP_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.runtime_env().to_string(),
        platform: platform(),
        uptime: app_state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        features: Features {
            authentication: format!("Platform identity ({} principal source)", config.principal_source),
            session: format!("Idle sign-out after {}s", config.idle_logout_secs),
            security: "Security headers + CORS".to_string(),
        },
    })
}
