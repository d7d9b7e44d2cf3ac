use crate::error::status_for;
use crate::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domain::AuthStatus;
use log::*;

/// GET whether the caller is authenticated, and as whom
///
/// Never fails outright: resolver errors come back as `authenticated: false`
/// with an `error` message and the status the failure maps to.
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Authentication status of the caller", body = AuthStatus),
        (status = 400, description = "Malformed client principal", body = AuthStatus),
        (status = 500, description = "Identity endpoint unreachable or failing", body = AuthStatus),
        (status = 502, description = "Invalid identity endpoint response", body = AuthStatus)
    )
)]
pub async fn status(State(app_state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let auth_status = app_state
        .principal_resolver
        .resolve_auth_status(&headers)
        .await;

    let status = auth_status
        .error_kind
        .as_ref()
        .map(status_for)
        .unwrap_or(StatusCode::OK);

    debug!(
        "Auth status: authenticated={} ({status})",
        auth_status.authenticated
    );

    (status, Json(auth_status))
}

/// GET the current user, same as `/api/auth/status`
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authentication status of the caller", body = AuthStatus),
        (status = 500, description = "Identity endpoint unreachable or failing", body = AuthStatus)
    )
)]
pub async fn me(state: State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    status(state, headers).await
}
