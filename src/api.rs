//! The uniform JSON result envelope shared by every endpoint.
//!
//! Successful operations respond with `{"success": true, "data": ...}` and
//! anticipated failures with `{"success": false, "error": "..."}`. Nothing is
//! allowed to cross the HTTP boundary as an unhandled error: unexpected
//! failures are logged and surfaced as a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::Error;

/// Build a success envelope around `data` with the given status code.
pub(crate) fn json_ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Build a failure envelope with the given status code and message.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// Convert an [Error] into a failure envelope response.
///
/// Errors the client can act on keep their message; internal errors are
/// logged server-side and replaced with a generic message so that no raw
/// error detail leaks to the client.
pub(crate) fn error_response(error: Error) -> Response {
    let status = match error {
        Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
        Error::Validation(_)
        | Error::InvalidCategory(_)
        | Error::UnsupportedFileType(_)
        | Error::FileTooLarge(_)
        | Error::MultipartError(_) => StatusCode::BAD_REQUEST,
        Error::NotFound => StatusCode::NOT_FOUND,
        Error::DuplicateEmail
        | Error::DuplicateCategoryName(_)
        | Error::ImmutableCategory
        | Error::CategoryInUse(_)
        | Error::InvoiceNotEditable(_)
        | Error::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
        Error::HashingError(_)
        | Error::JSONSerializationError(_)
        | Error::DatabaseLockError
        | Error::FileStorageError(_)
        | Error::SqlError(_) => {
            tracing::error!("an unexpected error occurred: {}", error);
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "an internal error occurred",
            );
        }
    };

    json_error(status, &error.to_string())
}
