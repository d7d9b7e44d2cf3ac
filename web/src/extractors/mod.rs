pub(crate) mod authenticated_user;

use axum::http::StatusCode;
use axum::Json;

type RejectionType = (StatusCode, Json<serde_json::Value>);
