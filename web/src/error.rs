use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

extern crate log;
use log::*;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

/// Maps a domain error kind to the status returned to the caller.
// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
pub(crate) fn status_for(error_kind: &DomainErrorKind) -> StatusCode {
    match error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Principal(_) => StatusCode::BAD_REQUEST,
            InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Upstream(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ExternalErrorKind::InvalidResponse => StatusCode::BAD_GATEWAY,
            ExternalErrorKind::Network | ExternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

/// Body returned whenever a request could not be authenticated.
pub(crate) fn unauthenticated_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "error": message,
        "authenticated": false,
    }))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self.0.error_kind);
        if status.is_server_error() {
            error!("Responding {status}: {}", self.0);
        } else {
            debug!("Responding {status}: {}", self.0);
        }
        (status, unauthenticated_body(&self.0.message())).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
