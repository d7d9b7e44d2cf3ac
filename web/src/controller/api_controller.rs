use crate::AppState;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// GET application info
#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "Application name, version and endpoints")
    )
)]
pub async fn info(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "portal_auth_rs",
        "version": env!("CARGO_PKG_VERSION"),
        "type": "web-application",
        "environment": app_state.config().runtime_env().to_string(),
        "endpoints": {
            "health": "/health",
            "status": "/api/status",
            "systemInfo": "/api/system/info",
            "authStatus": "/api/auth/status",
            "profile": "/api/profile",
            "sessionPolicy": "/api/session/policy",
            "info": "/api",
        },
    }))
}

/// Unknown `/api/*` routes get a JSON 404; everything else a plain one.
pub async fn not_found(uri: Uri) -> Response {
    let path = uri.path();
    if path.starts_with("/api/") {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "API route not found",
                "path": path,
            })),
        )
            .into_response()
    } else {
        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
    }
}
