//! Endpoint for fetching a single invoice.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error, api,
    invoice::{InvoiceId, InvoiceState, get_invoice_with_items},
    user::UserID,
};

/// Route handler returning one invoice with its items and derived total.
pub async fn get_invoice_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoice = get_invoice_with_items(invoice_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, invoice))
}
