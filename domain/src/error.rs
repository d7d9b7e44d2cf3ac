//! Error types for the `domain` layer.
use identity::error::{
    DecodeErrorKind, Error as IdentityError, ErrorKind as IdentityErrorKind, HttpErrorKind,
    UpstreamErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Ex. `domain` is dependent on `identity`, and `web` is dependent on `domain`,
/// but `web` should not be dependent, directly, on `identity` errors. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalErrorKind {
    Principal(PrincipalErrorKind),
    Config,
    Other(String),
}

/// Problems with the principal the platform handed us.
#[derive(Debug, Clone, PartialEq)]
pub enum PrincipalErrorKind {
    /// The client principal header could not be decoded.
    Malformed,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalErrorKind {
    /// The identity endpoint could not be reached.
    Network,
    /// The identity endpoint answered with a failure status other than 401.
    Upstream(u16),
    /// The identity endpoint answered 2xx with an unusable body.
    InvalidResponse,
    Other(String),
}

impl Error {
    /// Upstream status to propagate to the caller, when the identity endpoint supplied one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Upstream(status)) => Some(status),
            _ => None,
        }
    }

    /// Message suitable for a client-facing error body.
    pub fn message(&self) -> String {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Principal(_)) => {
                "Malformed client principal".to_string()
            }
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                "Authentication is misconfigured".to_string()
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => message.clone(),
            DomainErrorKind::External(ExternalErrorKind::Network) => match &self.source {
                Some(source) => format!("Failed to reach identity endpoint: {source}"),
                None => "Failed to reach identity endpoint".to_string(),
            },
            DomainErrorKind::External(ExternalErrorKind::Upstream(status)) => {
                format!("Identity endpoint returned status {status}")
            }
            DomainErrorKind::External(ExternalErrorKind::InvalidResponse) => {
                "Invalid response from identity endpoint".to_string()
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => message.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `identity` layer to the `domain` layer.
impl From<IdentityError> for Error {
    fn from(err: IdentityError) -> Self {
        let error_kind = match &err.error_kind {
            IdentityErrorKind::Decode(
                DecodeErrorKind::Base64 | DecodeErrorKind::Json | DecodeErrorKind::HeaderValue,
            ) => DomainErrorKind::Internal(InternalErrorKind::Principal(
                PrincipalErrorKind::Malformed,
            )),
            IdentityErrorKind::Upstream(UpstreamErrorKind::Status(status)) => {
                DomainErrorKind::External(ExternalErrorKind::Upstream(*status))
            }
            IdentityErrorKind::Upstream(UpstreamErrorKind::InvalidResponse) => {
                DomainErrorKind::External(ExternalErrorKind::InvalidResponse)
            }
            IdentityErrorKind::Http(HttpErrorKind::Network) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            IdentityErrorKind::Http(HttpErrorKind::BuilderFailed | HttpErrorKind::InvalidUrl) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
