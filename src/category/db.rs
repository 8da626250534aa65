//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, CategoryType},
    user::UserID,
};

/// The income categories every new user starts with.
pub const DEFAULT_INCOME_CATEGORIES: [&str; 4] =
    ["Salary", "Freelance", "Investments", "Other Income"];

/// The expense categories every new user starts with.
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 7] = [
    "Rent",
    "Utilities",
    "Food",
    "Transportation",
    "Entertainment",
    "Healthcare",
    "Other Expense",
];

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            is_default INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, name, type)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the default categories for a freshly registered user.
///
/// The caller is expected to run this inside the same SQL transaction that
/// creates the user, so a failure partway leaves no partial batch behind.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let mut statement = connection
        .prepare("INSERT INTO category (user_id, name, type, is_default) VALUES (?1, ?2, ?3, 1)")?;

    for name in DEFAULT_INCOME_CATEGORIES {
        statement.execute((user_id.as_i64(), name, CategoryType::Income))?;
    }

    for name in DEFAULT_EXPENSE_CATEGORIES {
        statement.execute((user_id.as_i64(), name, CategoryType::Expense))?;
    }

    Ok(())
}

/// Create a custom category and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name and type.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    category_type: CategoryType,
    connection: &Connection,
) -> Result<Category, Error> {
    if category_exists(user_id, &name, category_type, None, connection)? {
        return Err(Error::DuplicateCategoryName(name.to_string()));
    }

    connection.execute(
        "INSERT INTO category (user_id, name, type, is_default) VALUES (?1, ?2, ?3, 0)",
        (user_id.as_i64(), name.as_ref(), category_type),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id,
        name,
        category_type,
        is_default: false,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to a
/// different user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, is_default FROM category
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories, ordered by type then name.
pub fn get_all_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, is_default FROM category
            WHERE user_id = :user_id ORDER BY type ASC, name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename a custom category.
///
/// # Errors
/// - [Error::NotFound] if the category does not exist under `user_id`.
/// - [Error::ImmutableCategory] if the category is a default.
/// - [Error::DuplicateCategoryName] if another category of the same type
///   already has `new_name`.
pub fn rename_category(
    category_id: CategoryId,
    user_id: UserID,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = get_category(category_id, user_id, connection)?;

    if category.is_default {
        return Err(Error::ImmutableCategory);
    }

    if category_exists(
        user_id,
        &new_name,
        category.category_type,
        Some(category_id),
        connection,
    )? {
        return Err(Error::DuplicateCategoryName(new_name.to_string()));
    }

    connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id),
    )?;

    Ok(Category {
        name: new_name,
        ..category
    })
}

/// Delete a custom category that no transaction references.
///
/// # Errors
/// - [Error::NotFound] if the category does not exist under `user_id`.
/// - [Error::ImmutableCategory] if the category is a default.
/// - [Error::CategoryInUse] if any transactions still reference it; the error
///   carries the count.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, user_id, connection)?;

    if category.is_default {
        return Err(Error::ImmutableCategory);
    }

    let reference_count = count_transactions_for_category(category_id, connection)?;
    if reference_count > 0 {
        return Err(Error::CategoryInUse(reference_count));
    }

    connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    Ok(())
}

/// Count the transactions that reference `category_id`.
pub fn count_transactions_for_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .prepare("SELECT COUNT(*) FROM \"transaction\" WHERE category_id = :category_id")?
        .query_row(&[(":category_id", &category_id)], |row| row.get(0))
        .map_err(|error| error.into())
}

fn category_exists(
    user_id: UserID,
    name: &CategoryName,
    category_type: CategoryType,
    excluding: Option<CategoryId>,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection
        .prepare(
            "SELECT COUNT(*) FROM category
            WHERE user_id = :user_id AND name = :name AND type = :type AND id != :excluding",
        )?
        .query_row(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":name": name.as_ref(),
                ":type": category_type,
                ":excluding": excluding.unwrap_or(-1),
            },
            |row| row.get(0),
        )?;

    Ok(count > 0)
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(3)?,
        is_default: row.get(4)?,
    })
}
