//! Client invoices with embedded line items, auto-assigned numbers and a
//! linear status state machine.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod get;
mod list;
mod status;

pub use create::create_invoice_endpoint;
pub use db::{
    create_invoice, create_invoice_tables, delete_invoice, get_invoice_with_items, list_invoices,
    update_invoice, update_invoice_status, void_invoice,
};
pub use delete::delete_invoice_endpoint;
pub use domain::{
    Invoice, InvoiceId, InvoiceItem, InvoicePatch, InvoiceStatus, InvoiceSummary,
    InvoiceWithItems, NewInvoice, NewInvoiceItem, invoice_total, validate_items,
};
pub use edit::edit_invoice_endpoint;
pub use get::get_invoice_endpoint;
pub use list::list_invoices_endpoint;
pub use status::{update_invoice_status_endpoint, void_invoice_endpoint};

/// The state needed by the invoice endpoints.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
