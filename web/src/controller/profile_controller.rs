use crate::extractors::authenticated_user::AuthenticatedUser;
use axum::response::IntoResponse;
use axum::Json;
use domain::{Claim, Profile};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    authenticated: bool,
    profile: Profile,
    #[schema(value_type = Vec<Object>)]
    claims: Vec<Claim>,
    identity_provider: Option<String>,
}

/// GET the profile of the authenticated caller together with its raw claims
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the authenticated caller", body = ProfileResponse),
        (status = 400, description = "Malformed client principal"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Identity endpoint unreachable or failing")
    )
)]
pub async fn read(AuthenticatedUser(principal): AuthenticatedUser) -> impl IntoResponse {
    let identity_provider = principal.profile.identity_provider.clone();

    Json(ProfileResponse {
        authenticated: true,
        profile: principal.profile,
        claims: principal.claims,
        identity_provider,
    })
}
