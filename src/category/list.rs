//! Endpoint for listing the current user's categories.

use axum::{Extension, extract::State, http::StatusCode, response::Response};

use crate::{Error, api, category::CategoryState, user::UserID};

/// Route handler returning all of the current user's categories, ordered by
/// type then name.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let categories = super::get_all_categories(user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, categories))
}
