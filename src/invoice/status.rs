//! Endpoints for advancing and voiding an invoice's status.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    Error, api,
    invoice::{InvoiceId, InvoiceState, InvoiceStatus, update_invoice_status, void_invoice},
    user::UserID,
};

/// The form data for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    /// The status to move to.
    pub status: InvoiceStatus,
}

/// Route handler for advancing an invoice along the state machine.
///
/// Only draft → sent and sent → paid are accepted here; cancellation goes
/// through the void endpoint.
pub async fn update_invoice_status_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Path(invoice_id): Path<InvoiceId>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoice = update_invoice_status(invoice_id, user_id, payload.status, &connection)?;

    Ok(api::json_ok(StatusCode::OK, invoice))
}

/// Route handler for voiding a sent or paid invoice to cancelled.
pub async fn void_invoice_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoice = void_invoice(invoice_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, invoice))
}
