//! Endpoint for recording a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, api,
    category::{CategoryId, CategoryType},
    transaction::{NewTransaction, TransactionState, create_transaction},
    user::UserID,
};

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    /// Whether the entry records income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    /// The amount in minor currency units. Fractional values are rounded to
    /// the nearest whole unit on receipt.
    pub amount: f64,
    /// An optional free-text note.
    pub description: Option<String>,
    /// The category to file the entry under. Must belong to the current user
    /// and have the same type as the entry.
    pub category_id: CategoryId,
    /// The day the money moved.
    pub date: Date,
}

/// Convert a client-supplied amount to whole minor units.
///
/// Rounding happens exactly once, here at the boundary. Everything past this
/// point works in integers.
pub(super) fn amount_to_minor_units(amount: f64) -> Result<i64, Error> {
    if !amount.is_finite() {
        return Err(Error::Validation("amount must be a finite number".to_owned()));
    }

    if amount <= 0.0 {
        return Err(Error::Validation("amount must be positive".to_owned()));
    }

    let rounded = amount.round() as i64;

    if rounded < 1 {
        return Err(Error::Validation(
            "amount must round to at least one minor unit".to_owned(),
        ));
    }

    Ok(rounded)
}

/// Route handler for recording a transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<Response, Error> {
    let amount = amount_to_minor_units(payload.amount)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(
        user_id,
        NewTransaction {
            transaction_type: payload.transaction_type,
            amount,
            description: payload.description,
            category_id: payload.category_id,
            date: payload.date,
        },
        &connection,
    )?;

    Ok(api::json_ok(StatusCode::CREATED, transaction))
}
