//! Endpoint for fetching a single transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error, api,
    transaction::{TransactionId, TransactionState, get_transaction_with_category},
    user::UserID,
};

/// Route handler returning one transaction joined with its category.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = get_transaction_with_category(transaction_id, user_id, &connection)?;

    Ok(api::json_ok(StatusCode::OK, transaction))
}
