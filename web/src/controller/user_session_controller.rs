use crate::AppState;
use axum::extract::State;
use axum::response::Redirect;

/// GET sign in through the platform login endpoint
#[utoipa::path(
    get,
    path = "/signin",
    responses(
        (status = 303, description = "Redirects to the platform login endpoint")
    )
)]
pub async fn sign_in(State(app_state): State<AppState>) -> Redirect {
    Redirect::to(app_state.config().login_url())
}

/// GET create an account; the identity provider handles sign up on its login page
#[utoipa::path(
    get,
    path = "/create-account",
    responses(
        (status = 303, description = "Redirects to the platform login endpoint")
    )
)]
pub async fn create_account(state: State<AppState>) -> Redirect {
    sign_in(state).await
}

/// GET sign out through the platform logout endpoint
#[utoipa::path(
    get,
    path = "/signout",
    responses(
        (status = 303, description = "Redirects to the platform logout endpoint")
    )
)]
pub async fn sign_out(State(app_state): State<AppState>) -> Redirect {
    Redirect::to(app_state.config().logout_url())
}
