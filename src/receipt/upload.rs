//! Endpoint for uploading a receipt file.

use axum::{
    Extension,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use uuid::Uuid;

use crate::{
    Error, api,
    receipt::{
        MAX_RECEIPT_SIZE, ReceiptState, create_receipt, is_allowed_content_type,
    },
    transaction::{TransactionId, get_transaction},
    user::UserID,
};

struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Route handler for uploading a receipt.
///
/// Accepts multipart form data with a `file` field and an optional
/// `transaction_id` field. The upload is fully validated (content type,
/// size, transaction ownership) before anything touches the disk or the
/// database, so a rejected upload leaves no trace.
pub async fn upload_receipt_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    mut multipart: Multipart,
) -> Result<Response, Error> {
    let mut file: Option<UploadedFile> = None;
    let mut transaction_id: Option<TransactionId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("receipt").to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("transaction_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;
                let id = raw.parse().map_err(|_| {
                    Error::Validation(format!("invalid transaction_id {raw:?}"))
                })?;

                transaction_id = Some(id);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| Error::Validation("a file field is required".to_owned()))?;

    if !is_allowed_content_type(&file.content_type) {
        return Err(Error::UnsupportedFileType(file.content_type));
    }

    if file.bytes.len() > MAX_RECEIPT_SIZE {
        return Err(Error::FileTooLarge(file.bytes.len()));
    }

    if let Some(transaction_id) = transaction_id {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_transaction(transaction_id, user_id, &connection)?;
    }

    let stored_name = storage_name(&file.file_name);

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|error| Error::FileStorageError(error.to_string()))?;
    tokio::fs::write(state.upload_dir.join(&stored_name), &file.bytes)
        .await
        .map_err(|error| Error::FileStorageError(error.to_string()))?;

    let record = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        });

        connection.and_then(|connection| {
            create_receipt(
                user_id,
                transaction_id,
                &stored_name,
                &file.file_name,
                &connection,
            )
        })
    };

    // A file without a record is unreachable, so remove it if the insert
    // failed. Best effort: the failure that got us here is the one reported.
    let receipt = match record {
        Ok(receipt) => receipt,
        Err(error) => {
            let file_path = state.upload_dir.join(&stored_name);
            if let Err(remove_error) = tokio::fs::remove_file(&file_path).await {
                tracing::warn!("could not remove receipt file {file_path:?}: {remove_error}");
            }

            return Err(error);
        }
    };

    tracing::info!(
        "stored receipt {} as {stored_name}",
        receipt.file_name
    );

    Ok(api::json_ok(StatusCode::CREATED, receipt))
}

/// The generated name a file is stored under: a UUID plus the original
/// extension.
fn storage_name(original_file_name: &str) -> String {
    let uuid = Uuid::new_v4();

    match original_file_name.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => {
            format!("{uuid}.{}", extension.to_ascii_lowercase())
        }
        _ => uuid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::storage_name;

    #[test]
    fn storage_name_keeps_the_extension() {
        let name = storage_name("Lunch Receipt.PNG");

        assert!(name.ends_with(".png"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn storage_name_without_extension_is_a_bare_uuid() {
        let name = storage_name("receipt");

        assert!(!name.contains('.'));
        assert_eq!(name.len(), 36);
    }

    #[test]
    fn storage_names_are_unique() {
        assert_ne!(storage_name("a.png"), storage_name("a.png"));
    }
}
