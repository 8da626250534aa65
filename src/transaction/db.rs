//! Database operations for single transactions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, get_category},
    transaction::{
        CategorySummary, NewTransaction, Transaction, TransactionId, TransactionPatch,
        TransactionWithCategory,
    },
    user::UserID,
};

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            amount INTEGER NOT NULL,
            description TEXT,
            category_id INTEGER NOT NULL REFERENCES category(id),
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category
            ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Create a transaction and return it with its generated ID and timestamps.
///
/// # Errors
/// - [Error::InvalidCategory] if `category_id` does not resolve to one of the
///   user's categories.
/// - [Error::Validation] if the category's type does not match the
///   transaction's type.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = resolve_category(new_transaction.category_id, user_id, connection)?;
    check_type_matches(new_transaction.transaction_type, &category)?;

    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, type, amount, description, category_id, date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            user_id.as_i64(),
            new_transaction.transaction_type,
            new_transaction.amount,
            &new_transaction.description,
            new_transaction.category_id,
            new_transaction.date,
            now,
            now,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        user_id,
        transaction_type: new_transaction.transaction_type,
        amount: new_transaction.amount,
        description: new_transaction.description,
        category_id: new_transaction.category_id,
        date: new_transaction.date,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a single transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// a different user.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, description, category_id, date, created_at, updated_at
            FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single transaction joined with its category summary.
pub fn get_transaction_with_category(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionWithCategory, Error> {
    let transaction = get_transaction(transaction_id, user_id, connection)?;
    let category = get_category(transaction.category_id, user_id, connection)?;

    Ok(TransactionWithCategory {
        transaction,
        category: CategorySummary {
            id: category.id,
            name: category.name,
            category_type: category.category_type,
        },
    })
}

/// Apply a partial update to a transaction. Only the supplied fields change.
///
/// # Errors
/// - [Error::NotFound] if the transaction does not exist under `user_id`.
/// - [Error::InvalidCategory] if a supplied `category_id` does not resolve
///   under the user.
/// - [Error::Validation] if the effective category and transaction types
///   disagree after the patch.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(transaction_id, user_id, connection)?;

    let transaction_type = patch.transaction_type.unwrap_or(existing.transaction_type);
    let amount = patch.amount.unwrap_or(existing.amount);
    let description = patch.description.or(existing.description);
    let category_id = patch.category_id.unwrap_or(existing.category_id);
    let date = patch.date.unwrap_or(existing.date);

    let category = resolve_category(category_id, user_id, connection)?;
    check_type_matches(transaction_type, &category)?;

    let updated_at = OffsetDateTime::now_utc();

    connection.execute(
        "UPDATE \"transaction\"
        SET type = ?1, amount = ?2, description = ?3, category_id = ?4, date = ?5, updated_at = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            transaction_type,
            amount,
            &description,
            category_id,
            date,
            updated_at,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Transaction {
        transaction_type,
        amount,
        description,
        category_id,
        date,
        updated_at,
        ..existing
    })
}

/// Delete a transaction unconditionally.
///
/// Receipts that pointed at the transaction survive with their link nulled by
/// the schema's `ON DELETE SET NULL`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist under
/// `user_id`.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn resolve_category(
    category_id: i64,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    get_category(category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory(Some(category_id)),
        other => other,
    })
}

fn check_type_matches(
    transaction_type: crate::category::CategoryType,
    category: &Category,
) -> Result<(), Error> {
    if transaction_type != category.category_type {
        return Err(Error::Validation(format!(
            "a {} transaction cannot use the {} category \"{}\"",
            transaction_type, category.category_type, category.name
        )));
    }

    Ok(())
}

pub(super) fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        category_id: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;
    use time::Date;

    use crate::{
        category::{Category, CategoryName, CategoryType, create_category},
        db::initialize,
        transaction::{NewTransaction, Transaction},
        user::{PasswordHash, UserID, create_user},
    };

    pub fn get_test_db_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("fakehash"),
            "Test",
            &connection,
        )
        .expect("Could not create test user");

        (connection, user.id)
    }

    pub fn make_category(
        name: &str,
        category_type: CategoryType,
        user_id: UserID,
        connection: &Connection,
    ) -> Category {
        create_category(
            user_id,
            CategoryName::new(name).unwrap(),
            category_type,
            connection,
        )
        .expect("Could not create test category")
    }

    pub fn make_transaction(
        amount: i64,
        category: &Category,
        date: Date,
        user_id: UserID,
        connection: &Connection,
    ) -> Transaction {
        super::create_transaction(
            user_id,
            NewTransaction {
                transaction_type: category.category_type,
                amount,
                description: None,
                category_id: category.id,
                date,
            },
            connection,
        )
        .expect("Could not create test transaction")
    }
}
