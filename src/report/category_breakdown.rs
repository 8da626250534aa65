//! The per-category breakdown report for one transaction type.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::{
    Error, api,
    category::CategoryId,
    report::{ReportQueryParams, ReportState},
    transaction::{TransactionWithCategory, get_transactions_in_range},
    user::UserID,
};

/// One category's share of the period's income or spending.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryBreakdownEntry {
    /// The category's ID.
    pub category_id: CategoryId,
    /// The category's display name.
    pub category_name: String,
    /// The summed amount for this category, in minor units.
    pub amount: i64,
    /// This category's share of the grand total, 0 to 100.
    pub percentage: f64,
}

/// Aggregate fetched rows of one type into per-category sums with
/// percentages of the grand total, sorted by amount descending.
///
/// Percentages are the only floating point in the system and exist purely
/// for display. When the grand total is zero every percentage is zero.
pub fn build_category_breakdown(
    rows: &[TransactionWithCategory],
) -> Vec<CategoryBreakdownEntry> {
    let mut sums: HashMap<CategoryId, (String, i64)> = HashMap::new();
    let mut grand_total = 0;

    for row in rows {
        let entry = sums
            .entry(row.category.id)
            .or_insert_with(|| (row.category.name.to_string(), 0));
        entry.1 += row.transaction.amount;
        grand_total += row.transaction.amount;
    }

    let mut breakdown: Vec<CategoryBreakdownEntry> = sums
        .into_iter()
        .map(|(category_id, (category_name, amount))| {
            let percentage = if grand_total == 0 {
                0.0
            } else {
                amount as f64 / grand_total as f64 * 100.0
            };

            CategoryBreakdownEntry {
                category_id,
                category_name,
                amount,
                percentage,
            }
        })
        .collect();

    // Ties broken by name so the order is deterministic.
    breakdown.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    breakdown
}

/// Route handler for the category breakdown over an inclusive date range.
///
/// Requires a `type` parameter selecting income or expense categories.
pub async fn category_breakdown_endpoint(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Response, Error> {
    let (start_date, end_date) = params.date_range()?;
    let transaction_type = params.required_type()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let rows = get_transactions_in_range(
        user_id,
        start_date,
        end_date,
        Some(transaction_type),
        &connection,
    )?;

    Ok(api::json_ok(StatusCode::OK, build_category_breakdown(&rows)))
}
