//! The registration endpoint for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, api,
    category::seed_default_categories,
    user::{PasswordHash, UserID, db::create_user},
};

/// The minimum number of characters a password must have.
const PASSWORD_MIN_LENGTH: usize = 8;

/// The state needed for registering a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for creating the user and seeding categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for registering a new user.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterPayload {
    /// The new user's email address.
    pub email: String,
    /// The new user's password.
    pub password: String,
    /// The password typed a second time.
    pub confirm_password: String,
    /// The new user's display name.
    pub name: String,
}

/// The subset of the user record that is safe to return to the client.
#[derive(Debug, Serialize)]
struct RegisteredUser {
    id: UserID,
    email: String,
    name: String,
}

/// Route handler for registering a new user.
///
/// Validates the form, hashes the password, and creates the user together
/// with their default categories in one database transaction, so a failure
/// partway leaves no partial account behind.
pub async fn register_endpoint(
    State(state): State<RegistrationState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, Error> {
    validate_registration(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let password_hash = PasswordHash::from_raw_password(&payload.password, PasswordHash::COST)?;

    let mut connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = connection.transaction()?;
    let user = create_user(&email, password_hash, payload.name.trim(), &transaction)?;
    seed_default_categories(user.id, &transaction)?;
    transaction.commit()?;

    tracing::info!("registered user {}", user.id);

    Ok(api::json_ok(
        StatusCode::CREATED,
        RegisteredUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    ))
}

fn validate_registration(payload: &RegisterPayload) -> Result<(), Error> {
    if payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.confirm_password.is_empty()
        || payload.name.trim().is_empty()
    {
        return Err(Error::Validation("all fields are required".to_owned()));
    }

    if !is_valid_email(payload.email.trim()) {
        return Err(Error::Validation(
            "the email address is not valid".to_owned(),
        ));
    }

    if payload.password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(Error::Validation(format!(
            "the password must be at least {PASSWORD_MIN_LENGTH} characters long"
        )));
    }

    if payload.password != payload.confirm_password {
        return Err(Error::Validation("the passwords do not match".to_owned()));
    }

    Ok(())
}

/// A simple `local@domain.tld` check: a well-formed address whose domain
/// contains at least one dot.
fn is_valid_email(email: &str) -> bool {
    if !EmailAddress::is_valid(email) {
        return false;
    }

    match email.rsplit_once('@') {
        Some((_, domain)) => domain.contains('.'),
        None => false,
    }
}
