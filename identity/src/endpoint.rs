//! Client for the platform identity endpoint (`/.auth/me`).
//!
//! The endpoint answers with `[]` or `[principal]` for the session named by the
//! forwarded cookies. `401` is the documented "no session" signal.

use log::*;
use reqwest::header::{HeaderMap, ACCEPT, COOKIE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{upstream_error, Error, ErrorKind, UpstreamErrorKind};
use crate::principal::EndpointPrincipal;

/// Path of the identity endpoint on the hosting platform.
pub const ME_PATH: &str = "/.auth/me";
/// Platform session token header, forwarded alongside cookies.
pub const AUTH_TOKEN_HEADER: &str = "x-zumo-auth";

/// Builds the identity endpoint URL from configuration.
///
/// An explicit endpoint URL wins; otherwise `/.auth/me` on the configured public
/// origin. Inbound request headers never take part. `Ok(None)` when neither is set.
pub fn endpoint_url(
    configured_url: Option<&str>,
    public_origin: Option<&str>,
) -> Result<Option<Url>, Error> {
    if let Some(url) = non_blank(configured_url) {
        return Ok(Some(Url::parse(url)?));
    }
    match non_blank(public_origin) {
        Some(origin) => Ok(Some(Url::parse(origin)?.join(ME_PATH)?)),
        None => Ok(None),
    }
}

/// Session credentials forwarded to the identity endpoint.
#[derive(Clone, Default)]
pub struct ForwardedCredentials {
    pub cookie: Option<String>,
    pub auth_token: Option<SecretString>,
}

impl ForwardedCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies: Vec<&str> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        let cookie = (!cookies.is_empty()).then(|| cookies.join("; "));

        let auth_token = headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::new(token.to_string()));

        Self { cookie, auth_token }
    }

    /// True when there is nothing to identify a session with.
    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.auth_token.is_none()
    }
}

impl std::fmt::Debug for ForwardedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardedCredentials")
            .field("cookie", &self.cookie.as_ref().map(|_| "[REDACTED]"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Queries the identity endpoint on behalf of one inbound request.
#[derive(Debug, Clone)]
pub struct IdentityEndpointClient {
    client: reqwest::Client,
    url: Url,
}

impl IdentityEndpointClient {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches the principal for the session named by the inbound request headers.
    ///
    /// Makes exactly one outbound call. `Ok(None)` means "no session": either a
    /// `401` or an empty principal array.
    pub async fn fetch_principal(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<EndpointPrincipal>, Error> {
        let url = self.url.clone();
        let credentials = ForwardedCredentials::from_headers(headers);

        debug!("Querying identity endpoint {url} with {credentials:?}");

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &credentials.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = &credentials.auth_token {
            request = request.header(AUTH_TOKEN_HEADER, token.expose_secret().as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!("Failed to reach identity endpoint: {:?}", e);
            Error::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("Identity endpoint reported no session (401)");
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Identity endpoint error {}: {}", status, error_text);
            return Err(upstream_error(
                UpstreamErrorKind::Status(status.as_u16()),
                &error_text,
            ));
        }

        let principals: Vec<EndpointPrincipal> = response.json().await.map_err(|e| {
            warn!("Failed to parse identity endpoint response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Upstream(UpstreamErrorKind::InvalidResponse),
            }
        })?;

        Ok(principals.into_iter().next())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
