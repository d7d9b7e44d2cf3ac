use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::IdleTimerConfig;
use serde::Serialize;
use utoipa::ToSchema;

/// Idle session durations clients arm their timer with.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionPolicy {
    warning_after_seconds: u64,
    logout_after_seconds: u64,
    countdown_seconds: u32,
}

impl From<IdleTimerConfig> for SessionPolicy {
    fn from(config: IdleTimerConfig) -> Self {
        Self {
            warning_after_seconds: config.warning_after.as_secs(),
            logout_after_seconds: config.logout_after.as_secs(),
            countdown_seconds: config.countdown_secs,
        }
    }
}

/// GET the idle session timeout policy
#[utoipa::path(
    get,
    path = "/api/session/policy",
    responses(
        (status = 200, description = "Idle session timeout policy", body = SessionPolicy)
    )
)]
pub async fn read(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(SessionPolicy::from(IdleTimerConfig::from(app_state.config())))
}
