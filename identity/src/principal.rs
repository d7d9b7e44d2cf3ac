//! Raw principal records as delivered by the hosting platform.

use serde::Deserialize;

use crate::claims::Claim;

/// Principal decoded from the base64 `x-ms-client-principal` header.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderPrincipal {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub user_details: Option<String>,
    #[serde(default, alias = "auth_typ")]
    pub identity_provider: Option<String>,
    #[serde(default)]
    pub user_roles: Vec<String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl HeaderPrincipal {
    /// Explicit identifier carried by the payload, `userId` before `sid`.
    /// An empty value counts as absent.
    pub fn explicit_id(&self) -> Option<&str> {
        non_empty(&self.user_id).or_else(|| non_empty(&self.sid))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|id| !id.is_empty())
}

/// One element of the array returned by the platform identity endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndpointPrincipal {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_claims: Vec<Claim>,
    #[serde(default)]
    pub identity_provider: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Either of the two principal encodings found in the wild.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPrincipal {
    Header {
        principal: HeaderPrincipal,
        /// Value of `x-ms-client-principal-idp`, when the platform sent it.
        idp_header: Option<String>,
        /// Value of `x-ms-client-principal-name`, when the platform sent it.
        name_header: Option<String>,
    },
    Endpoint(EndpointPrincipal),
}

impl RawPrincipal {
    /// Claims carried by the principal, whichever encoding it came from.
    pub fn claims(&self) -> &[Claim] {
        match self {
            RawPrincipal::Header { principal, .. } => &principal.claims,
            RawPrincipal::Endpoint(principal) => &principal.user_claims,
        }
    }
}
