//! The log-in endpoint: verifies credentials and issues the session cookie.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, api,
    auth::set_auth_cookie,
    user::{User, UserID, get_user_by_email},
};

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInPayload {
    /// The email the user registered with.
    pub email: String,
    /// The user's password.
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoggedInUser {
    id: UserID,
    email: String,
    name: String,
}

/// Route handler for logging in a user.
///
/// A missing user and a wrong password both produce [Error::InvalidCredentials]
/// so the response does not reveal whether the email is registered.
pub async fn log_in_endpoint(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(payload): Json<LogInPayload>,
) -> Result<Response, Error> {
    let email = payload.email.trim().to_lowercase();

    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    verify_credentials(&user, &payload.password)?;

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    tracing::info!("user {} logged in", user.id);

    let response = api::json_ok(
        StatusCode::OK,
        LoggedInUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    );

    Ok((jar, response).into_response())
}

fn verify_credentials(user: &User, password: &str) -> Result<(), Error> {
    match user.password_hash.verify(password) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        user::{PasswordHash, User, UserID},
    };

    use super::verify_credentials;

    fn test_user() -> User {
        User {
            id: UserID::new(1),
            email: "alice@example.com".to_owned(),
            password_hash: PasswordHash::from_raw_password("opensesame", 4).unwrap(),
            name: "Alice".to_owned(),
        }
    }

    #[test]
    fn correct_password_is_accepted() {
        assert_eq!(verify_credentials(&test_user(), "opensesame"), Ok(()));
    }

    #[test]
    fn wrong_password_is_rejected_uniformly() {
        assert_eq!(
            verify_credentials(&test_user(), "letmein"),
            Err(Error::InvalidCredentials)
        );
    }
}
