//! Database initialization for the application.
//!
//! Each feature module owns its table definitions; this module stitches them
//! together so that the whole schema is created in one exclusive transaction.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, invoice::create_invoice_tables,
    receipt::create_receipt_table, transaction::create_transaction_table, user::create_user_table,
};

/// Create the application's tables and indexes if they do not exist.
///
/// Foreign key enforcement is switched on for the connection since the
/// receipt and invoice item tables rely on `ON DELETE` actions.
///
/// # Errors
/// Returns an [Error::SqlError] if any table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_invoice_tables(&transaction)?;
    create_receipt_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                ('user', 'category', 'transaction', 'invoice', 'invoice_item', 'receipt')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 6);
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Second initialize failed");
    }
}
