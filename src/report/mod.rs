//! Read-side reports aggregated from the transaction ledger.
//!
//! Reports hold no state of their own. Every call fetches the rows in range
//! and aggregates them in memory, so a report can never go stale.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{AppState, Error, category::CategoryType};

mod category_breakdown;
mod income_expense;

pub use category_breakdown::{
    CategoryBreakdownEntry, build_category_breakdown, category_breakdown_endpoint,
};
pub use income_expense::{
    IncomeExpenseReport, MonthlyBreakdown, build_income_expense_report,
    income_expense_report_endpoint,
};

/// The state needed by the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The date-range query parameters shared by both reports.
#[derive(Debug, Deserialize)]
pub struct ReportQueryParams {
    /// The first day of the reporting period.
    pub start_date: Option<Date>,
    /// The last day of the reporting period.
    pub end_date: Option<Date>,
    /// The transaction type to report on. Only the category breakdown uses
    /// this.
    #[serde(rename = "type")]
    pub transaction_type: Option<CategoryType>,
}

impl ReportQueryParams {
    /// The validated, inclusive date range. Both bounds are required.
    pub fn date_range(&self) -> Result<(Date, Date), Error> {
        let start_date = self
            .start_date
            .ok_or_else(|| Error::Validation("start_date is required".to_owned()))?;
        let end_date = self
            .end_date
            .ok_or_else(|| Error::Validation("end_date is required".to_owned()))?;

        if start_date > end_date {
            return Err(Error::Validation(
                "start_date must not be after end_date".to_owned(),
            ));
        }

        Ok((start_date, end_date))
    }

    /// The required transaction type for the category breakdown.
    pub fn required_type(&self) -> Result<CategoryType, Error> {
        self.transaction_type
            .ok_or_else(|| Error::Validation("type is required".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::ReportQueryParams;

    #[test]
    fn both_report_bounds_are_required() {
        let params = ReportQueryParams {
            start_date: Some(date!(2026 - 01 - 01)),
            end_date: None,
            transaction_type: None,
        };

        assert!(matches!(params.date_range(), Err(Error::Validation(_))));
    }

    #[test]
    fn inverted_report_ranges_are_rejected() {
        let params = ReportQueryParams {
            start_date: Some(date!(2026 - 02 - 01)),
            end_date: Some(date!(2026 - 01 - 01)),
            transaction_type: None,
        };

        assert!(matches!(params.date_range(), Err(Error::Validation(_))));
    }
}
