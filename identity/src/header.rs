//! Decoding of the platform-injected `x-ms-client-principal` header family.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::*;
use reqwest::header::HeaderMap;

use crate::error::{decode_error, DecodeErrorKind, Error};
use crate::principal::{HeaderPrincipal, RawPrincipal};

/// Base64 JSON principal injected by the platform authentication proxy.
pub const CLIENT_PRINCIPAL: &str = "x-ms-client-principal";
/// Identity provider that authenticated the caller.
pub const CLIENT_PRINCIPAL_IDP: &str = "x-ms-client-principal-idp";
/// Display name of the authenticated caller.
pub const CLIENT_PRINCIPAL_NAME: &str = "x-ms-client-principal-name";

// The proxy pads its output, but hand-built headers often don't.
const PRINCIPAL_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes a base64 JSON client principal.
pub fn decode_client_principal(encoded: &str) -> Result<HeaderPrincipal, Error> {
    let bytes = PRINCIPAL_ENGINE.decode(encoded.trim())?;
    let principal = serde_json::from_slice::<HeaderPrincipal>(&bytes)?;
    Ok(principal)
}

/// Reads the client principal header family from inbound request headers.
///
/// Returns `Ok(None)` when no principal header is present.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Option<RawPrincipal>, Error> {
    let Some(encoded) = headers.get(CLIENT_PRINCIPAL) else {
        trace!("No {CLIENT_PRINCIPAL} header present");
        return Ok(None);
    };

    let encoded = encoded.to_str().map_err(|_| {
        decode_error(
            DecodeErrorKind::HeaderValue,
            "client principal header is not visible ASCII",
        )
    })?;

    let principal = decode_client_principal(encoded)?;
    debug!(
        "Decoded client principal (claims: {}, roles: {})",
        principal.claims.len(),
        principal.user_roles.len()
    );

    Ok(Some(RawPrincipal::Header {
        principal,
        idp_header: header_string(headers, CLIENT_PRINCIPAL_IDP),
        name_header: header_string(headers, CLIENT_PRINCIPAL_NAME),
    }))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
