//! Receipt file attachments: uploaded files stored under generated names,
//! optionally linked to a transaction.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod db;
mod delete;
mod domain;
mod download;
mod link;
mod list;
mod upload;

pub use db::{
    create_receipt, create_receipt_table, delete_receipt, get_receipt,
    list_receipts_for_transaction, link_receipt,
};
pub use delete::delete_receipt_endpoint;
pub use domain::{MAX_RECEIPT_SIZE, Receipt, ReceiptId, content_type_for, is_allowed_content_type};
pub use download::download_receipt_endpoint;
pub use link::link_receipt_endpoint;
pub use list::list_transaction_receipts_endpoint;
pub use upload::upload_receipt_endpoint;

/// The state needed by the receipt endpoints.
#[derive(Debug, Clone)]
pub struct ReceiptState {
    /// The database connection for managing receipt records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The directory uploaded files are stored in.
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for ReceiptState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}
