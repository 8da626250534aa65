//! Endpoint for serving a stored receipt file.

use axum::{
    Extension,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    receipt::{ReceiptId, ReceiptState, content_type_for, get_receipt},
    user::UserID,
};

/// Route handler serving a receipt's bytes with a Content-Type derived from
/// the stored file's extension.
///
/// This is the one endpoint that returns a raw body instead of the JSON
/// envelope. A record whose backing file has gone missing is reported as
/// not found.
pub async fn download_receipt_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    Path(receipt_id): Path<ReceiptId>,
) -> Result<Response, Error> {
    let receipt = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_receipt(receipt_id, user_id, &connection)?
    };

    let file_path = state.upload_dir.join(&receipt.file_path);
    let bytes = tokio::fs::read(&file_path).await.map_err(|error| {
        tracing::warn!("could not read receipt file {file_path:?}: {error}");
        Error::NotFound
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&receipt.file_path))],
        bytes,
    )
        .into_response())
}
