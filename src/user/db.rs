//! Database operations for users.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    user::{PasswordHash, User, UserID},
};

/// Create the user table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_user_email ON user(email);",
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The caller should lower-case `email` beforehand so that look-ups are
/// case-insensitive.
///
/// # Errors
/// Returns [Error::DuplicateEmail] if a user with `email` already exists, or
/// [Error::SqlError] if another SQL error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    name: &str,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password_hash, name) VALUES (?1, ?2, ?3)",
        (email, password_hash.as_ref(), name),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_owned(),
        password_hash,
        name: name.to_owned(),
    })
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
/// Returns [Error::NotFound] if no user has that email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password_hash, name FROM user WHERE email = :email")?
        .query_row(&[(":email", email)], map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_hash),
        name: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, user::PasswordHash};

    use super::{create_user, get_user_by_email};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn test_hash() -> PasswordHash {
        PasswordHash::new_unchecked("$2b$04$fakehashfakehashfakehash")
    }

    #[test]
    fn create_user_succeeds() {
        let connection = get_test_db_connection();

        let user = create_user("alice@example.com", test_hash(), "Alice", &connection)
            .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn create_user_with_duplicate_email_fails() {
        let connection = get_test_db_connection();
        create_user("alice@example.com", test_hash(), "Alice", &connection).unwrap();

        let result = create_user("alice@example.com", test_hash(), "Alice Again", &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_email_round_trips() {
        let connection = get_test_db_connection();
        let inserted = create_user("bob@example.com", test_hash(), "Bob", &connection).unwrap();

        let selected = get_user_by_email("bob@example.com", &connection);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_user_by_unknown_email_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_user_by_email("nobody@example.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
