//! Pocketbook is a personal bookkeeping server.
//!
//! Authenticated users record income and expense transactions, organise them
//! with categories, issue client invoices, attach receipt files, and view
//! aggregate reports. The library exposes a JSON API where every operation
//! returns a uniform envelope: `{"success": true, "data": ...}` on success or
//! `{"success": false, "error": "..."}` on failure.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod invoice;
mod pagination;
mod receipt;
mod report;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use user::{PasswordHash, User, UserID};

use crate::{category::CategoryId, invoice::InvoiceStatus};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request carried no valid session.
    ///
    /// Returned before any store access so that no operation leaks data to
    /// anonymous callers.
    #[error("you must be logged in to do that")]
    Unauthorized,

    /// The submitted email and password did not match a stored user.
    ///
    /// A missing user and a wrong password produce the same error so that the
    /// existence of an email address cannot be probed.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Malformed, missing, or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// A user with the submitted email address already exists.
    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// A category with the same name and type already exists for this user.
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The requested resource was not found.
    ///
    /// A resource owned by another user is reported as absent, deliberately,
    /// so that other users' data cannot be enumerated.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Default categories are seeded at registration and can be neither
    /// renamed nor deleted.
    #[error("default categories cannot be renamed or deleted")]
    ImmutableCategory,

    /// A category cannot be deleted while transactions still reference it.
    #[error("this category is used by {0} transaction(s) and cannot be deleted")]
    CategoryInUse(i64),

    /// Invoices can only be edited or deleted while they are drafts.
    #[error("the invoice cannot be changed because its status is \"{0}\"")]
    InvoiceNotEditable(InvoiceStatus),

    /// The requested invoice status change is not allowed by the state
    /// machine (draft to sent, sent to paid, with cancellation via void).
    #[error("an invoice cannot move from \"{from}\" to \"{to}\"")]
    InvalidStatusTransition {
        /// The invoice's current status.
        from: InvoiceStatus,
        /// The status the caller asked for.
        to: InvoiceStatus,
    },

    /// The category ID used to create or update a transaction did not match
    /// one of the current user's categories.
    #[error("the category ID does not refer to one of your categories")]
    InvalidCategory(Option<CategoryId>),

    /// An uploaded file had a MIME type other than JPEG, PNG, or PDF.
    #[error("unsupported file type \"{0}\": only JPEG, PNG, and PDF files are accepted")]
    UnsupportedFileType(String),

    /// An uploaded file exceeded the size limit.
    #[error("the file is {0} bytes which exceeds the 5 MB limit")]
    FileTooLarge(usize),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// never sent to the client.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while writing an uploaded file to disk.
    #[error("could not store the uploaded file: {0}")]
    FileStorageError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        api::error_response(self)
    }
}
