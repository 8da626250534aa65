//! Endpoint for editing an existing transaction.

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
    category::{CategoryId, CategoryType},
    transaction::{
        TransactionId, TransactionPatch, TransactionState,
        create_endpoint::amount_to_minor_units, update_transaction,
    },
    user::UserID,
};

/// The form data for editing a transaction. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct EditTransactionPayload {
    /// Replace the transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<CategoryType>,
    /// Replace the amount (minor units, rounded on receipt).
    pub amount: Option<f64>,
    /// Replace the description.
    pub description: Option<String>,
    /// Refile the entry under a different category.
    pub category_id: Option<CategoryId>,
    /// Replace the date.
    pub date: Option<Date>,
}

/// Route handler for editing a transaction.
///
/// The updated row must still satisfy the creation rules: the category must
/// belong to the current user and match the entry's type.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<EditTransactionPayload>,
) -> Result<Response, Error> {
    let amount = payload.amount.map(amount_to_minor_units).transpose()?;

    let patch = TransactionPatch {
        transaction_type: payload.transaction_type,
        amount,
        description: payload.description,
        category_id: payload.category_id,
        date: payload.date,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = update_transaction(transaction_id, user_id, patch, &connection)?;

    Ok(api::json_ok(StatusCode::OK, transaction))
}
