//! Endpoint for editing a draft invoice.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, api,
    invoice::{InvoiceId, InvoicePatch, InvoiceState, NewInvoiceItem, update_invoice},
    user::UserID,
};

/// The form data for editing a draft invoice. Absent fields are left
/// unchanged; `items`, when present, replaces every line item.
#[derive(Debug, Default, Deserialize)]
pub struct EditInvoicePayload {
    /// Replace the client name.
    pub client_name: Option<String>,
    /// Replace the client email.
    pub client_email: Option<String>,
    /// Replace the issue date.
    pub issue_date: Option<Date>,
    /// Replace the due date.
    pub due_date: Option<Date>,
    /// Replace the notes.
    pub notes: Option<String>,
    /// Replace every line item.
    pub items: Option<Vec<NewInvoiceItem>>,
}

/// Route handler for editing an invoice.
///
/// Only draft invoices may be edited. Field changes and item replacement
/// happen in one database transaction.
pub async fn edit_invoice_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Path(invoice_id): Path<InvoiceId>,
    Json(payload): Json<EditInvoicePayload>,
) -> Result<Response, Error> {
    let patch = InvoicePatch {
        client_name: payload.client_name,
        client_email: payload.client_email.map(Some),
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        notes: payload.notes.map(Some),
        items: payload.items,
    };

    let mut connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoice = update_invoice(invoice_id, user_id, patch, &mut connection)?;

    Ok(api::json_ok(StatusCode::OK, invoice))
}
