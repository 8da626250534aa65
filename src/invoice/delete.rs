//! Endpoint for deleting a draft invoice.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::{
    Error, api,
    invoice::{InvoiceId, InvoiceState, delete_invoice},
    user::UserID,
};

/// Route handler for deleting an invoice. Only drafts may be deleted; line
/// items cascade with the invoice.
pub async fn delete_invoice_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_invoice(invoice_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, json!(null)))
}
