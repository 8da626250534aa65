//! Database functions for receipt records.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    receipt::{Receipt, ReceiptId},
    transaction::{TransactionId, get_transaction},
    user::UserID,
};

/// Create the receipt table if it does not exist.
///
/// Deleting a transaction sets the receipt's reference to null instead of
/// deleting the receipt, so orphan receipts are an expected state.
pub fn create_receipt_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS receipt (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            transaction_id INTEGER REFERENCES \"transaction\"(id) ON DELETE SET NULL,
            file_path TEXT NOT NULL,
            file_name TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_receipt_transaction ON receipt(transaction_id)",
        (),
    )?;

    Ok(())
}

/// Insert a receipt record for a file already written to the upload
/// directory.
///
/// When `transaction_id` is supplied, the transaction must belong to
/// `user_id`, otherwise [Error::NotFound] is returned.
pub fn create_receipt(
    user_id: UserID,
    transaction_id: Option<TransactionId>,
    file_path: &str,
    file_name: &str,
    connection: &Connection,
) -> Result<Receipt, Error> {
    if let Some(transaction_id) = transaction_id {
        get_transaction(transaction_id, user_id, connection)?;
    }

    let uploaded_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO receipt (user_id, transaction_id, file_path, file_name, uploaded_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id.as_i64(),
            transaction_id,
            file_path,
            file_name,
            uploaded_at
        ],
    )?;

    get_receipt(connection.last_insert_rowid(), user_id, connection)
}

/// Get a receipt by its ID, or [Error::NotFound] if it does not exist or
/// belongs to another user.
pub fn get_receipt(
    receipt_id: ReceiptId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Receipt, Error> {
    connection
        .prepare(
            "SELECT id, user_id, transaction_id, file_path, file_name, uploaded_at
            FROM receipt
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row(params![receipt_id, user_id.as_i64()], map_row)
        .map_err(|error| error.into())
}

/// All receipts attached to a transaction, newest first.
///
/// The transaction must belong to `user_id`.
pub fn list_receipts_for_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Receipt>, Error> {
    get_transaction(transaction_id, user_id, connection)?;

    connection
        .prepare(
            "SELECT id, user_id, transaction_id, file_path, file_name, uploaded_at
            FROM receipt
            WHERE transaction_id = ?1
            ORDER BY uploaded_at DESC, id DESC",
        )?
        .query_map(params![transaction_id], map_row)?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Attach a receipt to a transaction. Both must belong to `user_id`.
pub fn link_receipt(
    receipt_id: ReceiptId,
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Receipt, Error> {
    get_receipt(receipt_id, user_id, connection)?;
    get_transaction(transaction_id, user_id, connection)?;

    connection.execute(
        "UPDATE receipt SET transaction_id = ?1 WHERE id = ?2",
        params![transaction_id, receipt_id],
    )?;

    get_receipt(receipt_id, user_id, connection)
}

/// Delete a receipt record. The caller is responsible for the backing file.
pub fn delete_receipt(
    receipt_id: ReceiptId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM receipt WHERE id = ?1 AND user_id = ?2",
        params![receipt_id, user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Receipt, rusqlite::Error> {
    let raw_user_id: i64 = row.get(1)?;

    Ok(Receipt {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        transaction_id: row.get(2)?,
        file_path: row.get(3)?,
        file_name: row.get(4)?,
        uploaded_at: row.get(5)?,
    })
}
