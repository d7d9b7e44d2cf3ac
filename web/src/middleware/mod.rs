pub(crate) mod auth;
pub(crate) mod security_headers;
