//! Endpoint for listing the receipts attached to a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error, api,
    receipt::{ReceiptState, list_receipts_for_transaction},
    transaction::TransactionId,
    user::UserID,
};

/// Route handler returning a transaction's receipts, newest first.
pub async fn list_transaction_receipts_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let receipts = list_receipts_for_transaction(transaction_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, receipts))
}
