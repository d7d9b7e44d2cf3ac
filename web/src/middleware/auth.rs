use crate::error::{unauthenticated_body, Error as WebError};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;

/// Authentication middleware that returns 401 Unauthorized for unauthenticated requests.
///
/// On success the resolved principal is stored in the request extensions for
/// [`crate::extractors::authenticated_user::AuthenticatedUser`] to pick up.
/// Resolver failures keep their own status.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match app_state
        .principal_resolver
        .resolve(request.headers())
        .await
    {
        Ok(Some(principal)) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Ok(None) => {
            debug!("Rejecting unauthenticated request to {}", request.uri().path());
            (
                StatusCode::UNAUTHORIZED,
                unauthenticated_body("Not authenticated"),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Failed to resolve principal: {}", e.message());
            WebError::from(e).into_response()
        }
    }
}
