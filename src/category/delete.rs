//! Endpoint for deleting a custom category.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::{
    Error, api,
    category::{CategoryId, CategoryState, delete_category},
    user::UserID,
};

/// Route handler for deleting a custom category.
///
/// A category that any transaction still references cannot be deleted; the
/// error message carries the number of referencing transactions.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_category(category_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, json!(null)))
}
