//! The log-out endpoint: invalidates the session cookie.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::{api, auth::invalidate_auth_cookie};

/// Route handler for logging out the current user.
///
/// The auth cookie is overwritten with an already-expired value so the client
/// drops it.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, api::json_ok(StatusCode::OK, json!(null))).into_response()
}
