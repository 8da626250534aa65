//! Endpoint for creating a custom category.

use axum::{Extension, Json, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;

use crate::{
    Error, api,
    category::{CategoryName, CategoryState, CategoryType, create_category},
    user::UserID,
};

/// The form data for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryPayload {
    /// The new category's display name.
    pub name: String,
    /// Whether the category is for income or expense entries.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Route handler for creating a custom category.
///
/// Custom categories are never defaults, so they can later be renamed or
/// deleted.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<Response, Error> {
    let name = CategoryName::new(&payload.name)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(user_id, name, payload.category_type, &connection)?;

    Ok(api::json_ok(StatusCode::CREATED, category))
}
