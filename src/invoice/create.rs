//! Endpoint for creating a draft invoice.

use axum::{Extension, Json, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, api,
    invoice::{InvoiceState, NewInvoice, NewInvoiceItem, create_invoice},
    user::UserID,
};

/// The form data for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoicePayload {
    /// Who the invoice is billed to.
    pub client_name: String,
    /// The client's email address.
    pub client_email: Option<String>,
    /// The day the invoice is issued. Required.
    pub issue_date: Option<Date>,
    /// The day payment is due. Required.
    pub due_date: Option<Date>,
    /// Free-text notes shown on the invoice.
    pub notes: Option<String>,
    /// The invoice's line items, at least one.
    #[serde(default)]
    pub items: Vec<NewInvoiceItem>,
}

/// Route handler for creating an invoice.
///
/// The invoice starts as a draft with an auto-assigned per-user number. The
/// invoice row and its items are written in one database transaction.
pub async fn create_invoice_endpoint(
    State(state): State<InvoiceState>,
    Extension(user_id): Extension<UserID>,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<Response, Error> {
    let issue_date = payload
        .issue_date
        .ok_or_else(|| Error::Validation("issue_date is required".to_owned()))?;
    let due_date = payload
        .due_date
        .ok_or_else(|| Error::Validation("due_date is required".to_owned()))?;

    let mut connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let invoice = create_invoice(
        user_id,
        NewInvoice {
            client_name: payload.client_name,
            client_email: payload.client_email,
            issue_date,
            due_date,
            notes: payload.notes,
            items: payload.items,
        },
        &mut connection,
    )?;

    Ok(api::json_ok(StatusCode::CREATED, invoice))
}
