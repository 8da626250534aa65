//! The dashboard summary: current-month totals, overall net balance and the
//! most recent transactions.

use std::sync::{Arc, Mutex};

use axum::{Extension, extract::FromRef, extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, api,
    transaction::{
        TransactionFilter, TransactionWithCategory, get_recent_transactions,
        get_transaction_totals,
    },
    user::UserID,
};

/// How many recent transactions the dashboard shows.
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed by the dashboard endpoint.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Income recorded in the current calendar month, in minor units.
    pub current_month_income: i64,
    /// Expenses recorded in the current calendar month, in minor units.
    pub current_month_expenses: i64,
    /// Income minus expenses over the entire ledger, in minor units.
    pub net_balance: i64,
    /// The most recently dated transactions.
    pub recent_transactions: Vec<TransactionWithCategory>,
}

/// The first and last days of the calendar month containing `date`.
fn month_range(date: Date) -> (Date, Date) {
    // replace_day cannot fail for days 1..=28.
    let first = date.replace_day(1).unwrap_or(date);
    let last = first
        .replace_day(first.month().length(first.year()))
        .unwrap_or(date);

    (first, last)
}

/// Build the dashboard summary as of `today`.
pub fn build_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let (month_start, month_end) = month_range(today);

    let month_totals = get_transaction_totals(
        user_id,
        &TransactionFilter {
            start_date: Some(month_start),
            end_date: Some(month_end),
            category_ids: Vec::new(),
        },
        connection,
    )?;

    let overall_totals =
        get_transaction_totals(user_id, &TransactionFilter::default(), connection)?;

    let recent_transactions =
        get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, connection)?;

    Ok(DashboardSummary {
        current_month_income: month_totals.income,
        current_month_expenses: month_totals.expenses,
        net_balance: overall_totals.net,
        recent_transactions,
    })
}

/// Route handler for the dashboard summary.
///
/// "Current month" is the calendar month in UTC.
pub async fn dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let summary = build_summary(user_id, today, &connection)?;

    Ok(api::json_ok(StatusCode::OK, summary))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{category::CategoryType, transaction::test_utils::*};

    use super::{build_summary, month_range};

    #[test]
    fn month_range_covers_whole_month() {
        assert_eq!(
            month_range(date!(2026 - 02 - 14)),
            (date!(2026 - 02 - 01), date!(2026 - 02 - 28))
        );
        assert_eq!(
            month_range(date!(2024 - 02 - 14)),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            month_range(date!(2026 - 12 - 31)),
            (date!(2026 - 12 - 01), date!(2026 - 12 - 31))
        );
    }

    #[test]
    fn summary_splits_current_month_from_overall_balance() {
        let (connection, user_id) = get_test_db_connection();
        let salary = make_category("Salary", CategoryType::Income, user_id, &connection);
        let food = make_category("Food", CategoryType::Expense, user_id, &connection);

        // Last month: only affects the overall balance.
        make_transaction(100_000, &salary, date!(2026 - 07 - 15), user_id, &connection);
        // This month.
        make_transaction(500_000, &salary, date!(2026 - 08 - 10), user_id, &connection);
        make_transaction(40_000, &food, date!(2026 - 08 - 12), user_id, &connection);

        let summary = build_summary(user_id, date!(2026 - 08 - 28), &connection).unwrap();

        assert_eq!(summary.current_month_income, 500_000);
        assert_eq!(summary.current_month_expenses, 40_000);
        assert_eq!(summary.net_balance, 560_000);
        assert_eq!(summary.recent_transactions.len(), 3);
    }

    #[test]
    fn recent_transactions_are_capped_at_five() {
        let (connection, user_id) = get_test_db_connection();
        let food = make_category("Food", CategoryType::Expense, user_id, &connection);

        for day in 1..=8 {
            make_transaction(
                100,
                &food,
                date!(2026 - 08 - 01).replace_day(day).unwrap(),
                user_id,
                &connection,
            );
        }

        let summary = build_summary(user_id, date!(2026 - 08 - 28), &connection).unwrap();

        assert_eq!(summary.recent_transactions.len(), 5);
        assert_eq!(
            summary.recent_transactions[0].transaction.date,
            date!(2026 - 08 - 08)
        );
    }
}
