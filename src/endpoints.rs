//! The API endpoint URIs.
//!
//! Tests build concrete paths for endpoints that take a parameter, e.g.
//! '/api/categories/{category_id}', with `format_endpoint`.

/// The route for registering a new user.
pub const REGISTER: &str = "/api/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to rename or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to fetch, edit, or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for income/expense/net totals over a filter set.
pub const TRANSACTION_TOTALS: &str = "/api/transactions/totals";
/// The route to list the receipts attached to a transaction.
pub const TRANSACTION_RECEIPTS: &str = "/api/transactions/{transaction_id}/receipts";
/// The route for the dashboard summary of the current month.
pub const DASHBOARD: &str = "/api/dashboard";

/// The route to list and create invoices.
pub const INVOICES: &str = "/api/invoices";
/// The route to fetch, edit, or delete a single invoice.
pub const INVOICE: &str = "/api/invoices/{invoice_id}";
/// The route to advance an invoice's status.
pub const INVOICE_STATUS: &str = "/api/invoices/{invoice_id}/status";
/// The route to void a sent or paid invoice.
pub const INVOICE_VOID: &str = "/api/invoices/{invoice_id}/void";

/// The route to upload a receipt file.
pub const RECEIPTS: &str = "/api/receipts";
/// The route to delete a single receipt.
pub const RECEIPT: &str = "/api/receipts/{receipt_id}";
/// The route to link a receipt to a transaction.
pub const RECEIPT_LINK: &str = "/api/receipts/{receipt_id}/link";
/// The route to download a receipt's file.
pub const RECEIPT_FILE: &str = "/api/receipts/{receipt_id}/file";

/// The route for the time-bucketed income and expense report.
pub const REPORT_INCOME_EXPENSE: &str = "/api/reports/income_expense";
/// The route for the category percentage breakdown report.
pub const REPORT_CATEGORY_BREAKDOWN: &str = "/api/reports/category_breakdown";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/categories/{category_id}',
/// '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (index, character) in endpoint_path.char_indices() {
        match character {
            '{' => param_start = Some(index),
            '}' => {
                param_end = Some(index);
                break;
            }
            _ => {}
        }
    }

    match (param_start, param_end) {
        (Some(start), Some(end)) if start < end => {
            let mut formatted = String::with_capacity(endpoint_path.len());
            formatted.push_str(&endpoint_path[..start]);
            formatted.push_str(&id.to_string());
            formatted.push_str(&endpoint_path[end + 1..]);
            formatted
        }
        _ => endpoint_path.to_owned(),
    }
}
