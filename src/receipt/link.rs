//! Endpoint for attaching a receipt to a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    Error, api,
    receipt::{ReceiptId, ReceiptState, link_receipt},
    transaction::TransactionId,
    user::UserID,
};

/// The form data for linking a receipt.
#[derive(Debug, Deserialize)]
pub struct LinkReceiptPayload {
    /// The transaction to attach the receipt to.
    pub transaction_id: TransactionId,
}

/// Route handler for attaching a receipt to a transaction. Both must belong
/// to the current user.
pub async fn link_receipt_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    Path(receipt_id): Path<ReceiptId>,
    Json(payload): Json<LinkReceiptPayload>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let receipt = link_receipt(receipt_id, payload.transaction_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, receipt))
}
