use crate::error::unauthenticated_body;
use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::ResolvedPrincipal;

pub(crate) struct AuthenticatedUser(pub ResolvedPrincipal);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Reads the principal that `require_auth` resolved for this request.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ResolvedPrincipal>() {
            Some(principal) => Ok(AuthenticatedUser(principal.clone())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                unauthenticated_body("Not authenticated"),
            )),
        }
    }
}
