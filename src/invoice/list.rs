//! Endpoint for listing the current user's invoices.

use axum::{Extension, extract::State, http::StatusCode, response::Response};

use crate::{
    Error, api,
    invoice::{InvoiceState, list_invoices},
    user::UserID,
};

/// Route handler returning every invoice owned by the current user, sorted
/// by issue date descending, each annotated with its derived total.
pub async fn list_invoices_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoices = list_invoices(user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, invoices))
}
