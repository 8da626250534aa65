//! Endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::{
    Error, api,
    transaction::{TransactionId, TransactionState, delete_transaction},
    user::UserID,
};

/// Route handler for deleting a transaction.
///
/// Receipts attached to the deleted transaction are kept and become
/// unlinked.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, json!(null)))
}
