//! Domain types and file rules for receipt attachments.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{transaction::TransactionId, user::UserID};

/// An alias for integer receipt IDs.
pub type ReceiptId = i64;

/// The largest accepted upload, 5 MB.
pub const MAX_RECEIPT_SIZE: usize = 5 * 1024 * 1024;

/// An uploaded receipt file's database record.
///
/// `file_path` is the generated name the bytes are stored under in the
/// upload directory; `file_name` is the name the client uploaded. A receipt
/// may be an orphan (no transaction) either from an unlinked upload or after
/// its transaction was deleted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Receipt {
    /// The receipt's ID in the application database.
    pub id: ReceiptId,
    /// The user this receipt belongs to.
    pub user_id: UserID,
    /// The transaction this receipt is attached to, if any.
    pub transaction_id: Option<TransactionId>,
    /// The generated name the file is stored under.
    pub file_path: String,
    /// The original name of the uploaded file.
    pub file_name: String,
    /// When the file was uploaded.
    pub uploaded_at: OffsetDateTime,
}

/// Whether an upload's declared content type is accepted.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    matches!(content_type, "image/jpeg" | "image/png" | "application/pdf")
}

/// The Content-Type to serve a stored file with, derived from its extension.
pub fn content_type_for(file_path: &str) -> &'static str {
    let extension = file_path
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
