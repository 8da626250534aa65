//! The income and expense report with a chronological monthly breakdown.

use std::collections::BTreeMap;

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::{
    Error, api,
    category::CategoryType,
    report::{ReportQueryParams, ReportState},
    transaction::{TransactionWithCategory, get_transactions_in_range},
    user::UserID,
};

/// One calendar month's totals within the reporting period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    /// A display label like `August 2026`.
    pub label: String,
    /// The calendar year.
    pub year: i32,
    /// The zero-based month index, 0 for January through 11 for December.
    pub month: u8,
    /// Income recorded in this month, in minor units.
    pub income: i64,
    /// Expenses recorded in this month, in minor units.
    pub expenses: i64,
    /// `income - expenses` for this month.
    pub net: i64,
}

/// The full income and expense report for a date range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncomeExpenseReport {
    /// The sum of all income in the period, in minor units.
    pub total_income: i64,
    /// The sum of all expenses in the period, in minor units.
    pub total_expenses: i64,
    /// `total_income - total_expenses`.
    pub net_profit_loss: i64,
    /// Per-month totals, sorted chronologically ascending.
    pub monthly_breakdown: Vec<MonthlyBreakdown>,
}

/// Aggregate fetched rows into the income and expense report.
///
/// Months with no transactions are omitted rather than emitted as zero
/// rows. The BTreeMap key keeps the breakdown chronologically sorted.
pub fn build_income_expense_report(rows: &[TransactionWithCategory]) -> IncomeExpenseReport {
    let mut total_income = 0;
    let mut total_expenses = 0;
    let mut months: BTreeMap<(i32, u8), (i64, i64)> = BTreeMap::new();

    for row in rows {
        let transaction = &row.transaction;
        let key = (
            transaction.date.year(),
            transaction.date.month() as u8 - 1,
        );
        let bucket = months.entry(key).or_insert((0, 0));

        match transaction.transaction_type {
            CategoryType::Income => {
                total_income += transaction.amount;
                bucket.0 += transaction.amount;
            }
            CategoryType::Expense => {
                total_expenses += transaction.amount;
                bucket.1 += transaction.amount;
            }
        }
    }

    let monthly_breakdown = months
        .into_iter()
        .map(|((year, month), (income, expenses))| {
            let month_name = time::Month::January.nth_next(month);

            MonthlyBreakdown {
                label: format!("{month_name} {year}"),
                year,
                month,
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect();

    IncomeExpenseReport {
        total_income,
        total_expenses,
        net_profit_loss: total_income - total_expenses,
        monthly_breakdown,
    }
}

/// Route handler for the income and expense report over an inclusive date
/// range.
pub async fn income_expense_report_endpoint(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Response, Error> {
    let (start_date, end_date) = params.date_range()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let rows = get_transactions_in_range(user_id, start_date, end_date, None, &connection)?;

    Ok(api::json_ok(
        StatusCode::OK,
        build_income_expense_report(&rows),
    ))
}
