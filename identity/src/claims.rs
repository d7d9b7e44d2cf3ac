//! Claims and claim alias resolution.
//!
//! Identity tokens frequently carry the same semantic field under several claim
//! types: short OIDC names (`email`, `given_name`) and the legacy WS-Federation
//! claim URIs. Each profile field owns an ordered alias list; the first alias
//! present in the claim set wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Legacy claim URI carrying the email address.
pub const EMAIL_ADDRESS_CLAIM: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";

/// A single typed assertion about an identity.
///
/// The platform emits claims as `{"typ": ..., "val": ...}`; `{"type": ..., "value": ...}`
/// is accepted as well. Claims always serialize as `type`/`value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename(serialize = "type", deserialize = "typ"), alias = "type")]
    pub claim_type: String,
    #[serde(rename(serialize = "value", deserialize = "val"), alias = "value")]
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Profile fields that can be resolved from claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Id,
    Name,
    GivenName,
    Surname,
    Email,
    UserPrincipalName,
    TenantId,
}

/// Ordered alias lists, highest priority first.
const ALIASES: &[(ProfileField, &[&str])] = &[
    (
        ProfileField::Id,
        &[
            "oid",
            "http://schemas.microsoft.com/identity/claims/objectidentifier",
            "sub",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
        ],
    ),
    (
        ProfileField::Name,
        &[
            "name",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
        ],
    ),
    (
        ProfileField::GivenName,
        &[
            "given_name",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/givenname",
        ],
    ),
    (
        ProfileField::Surname,
        &[
            "family_name",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/surname",
        ],
    ),
    (
        ProfileField::Email,
        &["email", "emails", EMAIL_ADDRESS_CLAIM],
    ),
    (
        ProfileField::UserPrincipalName,
        &[
            "preferred_username",
            "upn",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn",
        ],
    ),
    (
        ProfileField::TenantId,
        &[
            "tid",
            "http://schemas.microsoft.com/identity/claims/tenantid",
        ],
    ),
];

impl ProfileField {
    /// Claim types that resolve this field, in priority order.
    pub fn aliases(&self) -> &'static [&'static str] {
        ALIASES
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }
}

/// Claim lookup keyed by claim type.
///
/// When a claim type repeats, the first occurrence is kept.
#[derive(Debug, Default, Clone)]
pub struct ClaimSet<'a> {
    by_type: HashMap<&'a str, &'a str>,
}

impl<'a> ClaimSet<'a> {
    pub fn new(claims: &'a [Claim]) -> Self {
        let mut by_type = HashMap::with_capacity(claims.len());
        for claim in claims {
            by_type
                .entry(claim.claim_type.as_str())
                .or_insert(claim.value.as_str());
        }
        Self { by_type }
    }

    /// Value of the first claim whose type matches the field's alias list.
    pub fn resolve(&self, field: ProfileField) -> Option<String> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.by_type.get(alias))
            .map(|value| value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
