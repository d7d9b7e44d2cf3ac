//! Sources a raw principal can be read from.

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::claims::Claim;
use crate::endpoint::IdentityEndpointClient;
use crate::error::Error;
use crate::header::principal_from_headers;
use crate::principal::RawPrincipal;
use crate::profile::Profile;

/// Something that can produce the raw principal behind an inbound request.
///
/// `Ok(None)` is the valid unauthenticated state, not an error.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn principal(&self, headers: &HeaderMap) -> Result<Option<RawPrincipal>, Error>;
}

/// Reads the platform-injected `x-ms-client-principal` header family.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSource;

#[async_trait]
impl IdentitySource for HeaderSource {
    async fn principal(&self, headers: &HeaderMap) -> Result<Option<RawPrincipal>, Error> {
        principal_from_headers(headers)
    }
}

#[async_trait]
impl IdentitySource for IdentityEndpointClient {
    async fn principal(&self, headers: &HeaderMap) -> Result<Option<RawPrincipal>, Error> {
        Ok(self
            .fetch_principal(headers)
            .await?
            .map(RawPrincipal::Endpoint))
    }
}

/// A principal normalized for the application, with the claims it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrincipal {
    pub profile: Profile,
    pub claims: Vec<Claim>,
}

impl ResolvedPrincipal {
    pub fn from_raw(raw: RawPrincipal, default_provider: &str) -> Self {
        let profile = Profile::from_principal(&raw, default_provider);
        let claims = match raw {
            RawPrincipal::Header { principal, .. } => principal.claims,
            RawPrincipal::Endpoint(principal) => principal.user_claims,
        };
        Self { profile, claims }
    }
}
