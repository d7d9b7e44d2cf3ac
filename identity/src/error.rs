//! Error types for the `identity` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the identity crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in identity.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Decode(DecodeErrorKind),
    Upstream(UpstreamErrorKind),
    Http(HttpErrorKind),
}

/// Errors from decoding a platform-injected client principal header.
#[derive(Debug, PartialEq)]
pub enum DecodeErrorKind {
    /// Header value is not valid base64.
    Base64,
    /// Decoded payload is not a principal JSON document.
    Json,
    /// Header value contains non-visible ASCII characters.
    HeaderValue,
}

/// Errors reported by the identity endpoint itself.
#[derive(Debug, PartialEq)]
pub enum UpstreamErrorKind {
    /// Non-2xx, non-401 status returned by the identity endpoint.
    Status(u16),
    /// 2xx response whose body is not a principal array.
    InvalidResponse,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    InvalidUrl,
    Network,
}

impl Error {
    /// Upstream status code carried by this error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self.error_kind {
            ErrorKind::Upstream(UpstreamErrorKind::Status(status)) => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Decode(kind) => write!(f, "Client principal decode error: {:?}", kind)?,
            ErrorKind::Upstream(UpstreamErrorKind::Status(status)) => {
                write!(f, "Identity endpoint returned status {}", status)?
            }
            ErrorKind::Upstream(kind) => write!(f, "Identity endpoint error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::InvalidUrl),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Decode(DecodeErrorKind::Base64),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Decode(DecodeErrorKind::Json),
        }
    }
}

/// Helper function to create decode errors.
pub fn decode_error(kind: DecodeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Decode(kind),
    }
}

/// Helper function to create upstream errors.
pub fn upstream_error(kind: UpstreamErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Upstream(kind),
    }
}
