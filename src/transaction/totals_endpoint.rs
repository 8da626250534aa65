//! Endpoint for income/expense totals over a filtered set of transactions.

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error, api,
    transaction::{
        TransactionState, get_transaction_totals,
        list_endpoint::{TransactionQueryParams, build_filter},
    },
    user::UserID,
};

/// Route handler for the unpaginated totals of a filtered transaction set.
///
/// Accepts the same filters as the listing endpoint; `page` and `limit` are
/// ignored so the totals always cover every matching row.
pub async fn transaction_totals_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<TransactionQueryParams>,
) -> Result<Response, Error> {
    let filter = build_filter(&params)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let totals = get_transaction_totals(user_id, &filter, &connection)?;

    Ok(api::json_ok(StatusCode::OK, totals))
}
