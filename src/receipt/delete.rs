//! Endpoint for deleting a receipt.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::{
    Error, api,
    receipt::{ReceiptId, ReceiptState, delete_receipt, get_receipt},
    user::UserID,
};

/// Route handler for deleting a receipt.
///
/// Removing the backing file is best effort: a failure is logged and
/// swallowed so the database record is always removed, and a record never
/// outlives an intentional delete.
pub async fn delete_receipt_endpoint(
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
    if let Err(error) = tokio::fs::remove_file(&file_path).await {
        tracing::warn!("could not remove receipt file {file_path:?}: {error}");
    }

    {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        delete_receipt(receipt_id, user_id, &connection)?;
    }

    Ok(api::json_ok(StatusCode::OK, json!(null)))
}
