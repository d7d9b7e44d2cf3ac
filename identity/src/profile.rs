//! Normalized, application-facing identity profile.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::claims::{ClaimSet, ProfileField};
use crate::principal::RawPrincipal;

/// Identity provider assumed when neither the platform headers nor the principal name one.
pub const DEFAULT_IDENTITY_PROVIDER: &str = "aad";

/// Normalized identity. Every field is optional; unknown values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub identity_provider: Option<String>,
    pub user_principal_name: Option<String>,
    pub tenant_id: Option<String>,
}

impl Profile {
    /// Maps a raw principal to a profile.
    ///
    /// Explicit identifiers on the principal beat claims for `id`. `identity_provider`
    /// never comes from claims. Everything else is claim alias resolution, except that
    /// a header principal's `userDetails` (or the companion name header) supplies `name`.
    pub fn from_principal(raw: &RawPrincipal, default_provider: &str) -> Self {
        let claims = ClaimSet::new(raw.claims());

        let (explicit_id, explicit_name, provider) = match raw {
            RawPrincipal::Header {
                principal,
                idp_header,
                name_header,
            } => (
                principal.explicit_id().map(str::to_string),
                non_empty(principal.user_details.as_deref())
                    .or_else(|| non_empty(name_header.as_deref())),
                non_empty(idp_header.as_deref())
                    .or_else(|| non_empty(principal.identity_provider.as_deref())),
            ),
            RawPrincipal::Endpoint(principal) => (
                non_empty(principal.user_id.as_deref()),
                None,
                non_empty(principal.identity_provider.as_deref()),
            ),
        };

        Profile {
            id: explicit_id.or_else(|| claims.resolve(ProfileField::Id)),
            name: explicit_name.or_else(|| claims.resolve(ProfileField::Name)),
            given_name: claims.resolve(ProfileField::GivenName),
            surname: claims.resolve(ProfileField::Surname),
            email: claims.resolve(ProfileField::Email),
            identity_provider: Some(provider.unwrap_or_else(|| default_provider.to_string())),
            user_principal_name: claims.resolve(ProfileField::UserPrincipalName),
            tenant_id: claims.resolve(ProfileField::TenantId),
        }
    }

    /// Best label to greet the user with.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.user_principal_name.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
