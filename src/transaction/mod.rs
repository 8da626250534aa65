//! The transaction ledger: dated, categorized monetary entries with
//! filtered listing and aggregate totals.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod query;
mod totals_endpoint;

pub use create_endpoint::create_transaction_endpoint;
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transaction_with_category, update_transaction,
};
pub use delete_endpoint::delete_transaction_endpoint;
pub use domain::{
    CategorySummary, NewTransaction, Transaction, TransactionId, TransactionPatch,
    TransactionWithCategory,
};
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{
    TransactionFilter, count_transactions, get_recent_transactions, get_transactions_in_range,
    get_transactions_page, get_transaction_totals,
};
pub use totals_endpoint::transaction_totals_endpoint;

#[cfg(test)]
pub(crate) use db::test_utils;

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page lists of data.
    pub pagination_config: crate::pagination::PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
