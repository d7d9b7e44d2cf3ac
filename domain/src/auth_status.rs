//! Principal resolution: is this request authenticated, and as whom?
//!
//! The platform delivers identity two ways: an injected base64 JSON header and a
//! configured `/.auth/me` endpoint. One canonical policy picks between them
//! (see [`PrincipalSource`]) and both are normalized into the same [`Profile`].

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use identity::endpoint::ForwardedCredentials;
use identity::header::CLIENT_PRINCIPAL;
use identity::{
    endpoint_url, HeaderSource, IdentityEndpointClient, IdentitySource, Profile,
    ResolvedPrincipal,
};
use log::*;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use service::config::{Config, PrincipalSource};
use utoipa::ToSchema;

/// Outcome of resolving an inbound request. `authenticated` is true iff `user` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip)]
    pub error_kind: Option<DomainErrorKind>,
}

impl AuthStatus {
    pub fn authenticated(user: Profile) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
            error: None,
            error_kind: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            user: None,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            authenticated: false,
            user: None,
            error: Some(error.message()),
            error_kind: Some(error.error_kind.clone()),
        }
    }

    /// Upstream identity endpoint status carried by a failed resolution.
    pub fn upstream_status(&self) -> Option<u16> {
        match self.error_kind {
            Some(DomainErrorKind::External(ExternalErrorKind::Upstream(status))) => Some(status),
            _ => None,
        }
    }
}

/// Resolves inbound request headers to an identity.
///
/// Stateless across requests: it shares only an immutable HTTP client, so one
/// instance serves every request concurrently.
#[derive(Debug, Clone)]
pub struct PrincipalResolver {
    source: PrincipalSource,
    /// Only ever built from configuration, never from inbound headers.
    endpoint: Option<IdentityEndpointClient>,
    default_provider: String,
}

impl PrincipalResolver {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Result<Self, Error> {
        let url = endpoint_url(config.identity_endpoint_url(), config.public_origin()).map_err(
            |e| {
                error!("Invalid identity endpoint configuration: {e}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
                }
            },
        )?;

        match (&url, config.principal_source) {
            (None, PrincipalSource::Endpoint) => {
                error!("Principal source is endpoint but neither an identity endpoint URL nor a public origin is configured");
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
                });
            }
            (None, PrincipalSource::Auto) => {
                info!("No identity endpoint configured, resolving principals from headers only")
            }
            (Some(url), _) => info!("Identity endpoint: {url}"),
            (None, PrincipalSource::Header) => {}
        }

        Ok(Self {
            source: config.principal_source,
            endpoint: url.map(|url| IdentityEndpointClient::new(http_client, url)),
            default_provider: config.default_identity_provider().to_string(),
        })
    }

    pub fn source(&self) -> PrincipalSource {
        self.source
    }

    /// Resolves the principal behind a request.
    ///
    /// `Ok(None)` is the valid unauthenticated state.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Option<ResolvedPrincipal>, Error> {
        let raw = match self.source {
            PrincipalSource::Header => HeaderSource.principal(headers).await?,
            PrincipalSource::Endpoint => match &self.endpoint {
                Some(endpoint) => endpoint.principal(headers).await?,
                None => None,
            },
            PrincipalSource::Auto => {
                let has_credentials = !ForwardedCredentials::from_headers(headers).is_empty();
                match &self.endpoint {
                    _ if headers.contains_key(CLIENT_PRINCIPAL) => {
                        HeaderSource.principal(headers).await?
                    }
                    Some(endpoint) if has_credentials => endpoint.principal(headers).await?,
                    _ => {
                        trace!("No principal header and no identity endpoint to ask");
                        None
                    }
                }
            }
        };

        Ok(raw.map(|raw| ResolvedPrincipal::from_raw(raw, &self.default_provider)))
    }

    /// Resolves a request to an [`AuthStatus`]. Never fails: every error becomes
    /// an unauthenticated status carrying the error message.
    pub async fn resolve_auth_status(&self, headers: &HeaderMap) -> AuthStatus {
        match self.resolve(headers).await {
            Ok(Some(resolved)) => {
                debug!(
                    "Resolved principal id={:?} provider={:?}",
                    resolved.profile.id, resolved.profile.identity_provider
                );
                AuthStatus::authenticated(resolved.profile)
            }
            Ok(None) => AuthStatus::unauthenticated(),
            Err(e) => {
                match e.error_kind {
                    DomainErrorKind::Internal(InternalErrorKind::Principal(_)) => {
                        warn!("Treating request as unauthenticated: {}", e.message())
                    }
                    _ => error!("Failed to resolve authentication status: {e}"),
                }
                AuthStatus::failed(&e)
            }
        }
    }
}
