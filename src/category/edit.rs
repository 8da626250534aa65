//! Endpoint for renaming a custom category.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    Error, api,
    category::{CategoryId, CategoryName, CategoryState, rename_category},
    user::UserID,
};

/// The form data for renaming a category.
#[derive(Debug, Deserialize)]
pub struct RenameCategoryPayload {
    /// The new display name.
    pub name: String,
}

/// Route handler for renaming a custom category. Only the name changes;
/// default categories are rejected.
pub async fn rename_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Json(payload): Json<RenameCategoryPayload>,
) -> Result<Response, Error> {
    let new_name = CategoryName::new(&payload.name)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = rename_category(category_id, user_id, new_name, &connection)?;

    Ok(api::json_ok(StatusCode::OK, category))
}
