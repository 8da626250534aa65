//! Defines functions for handling user authentication with cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Token, user::UserID};

/// The name of the cookie holding the serialized [Token].
pub(crate) const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in
/// and authenticated.
///
/// Sets the expiry of the session to `duration` from the current time.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(expires_at)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which
/// should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Extract and check the auth token from the cookie jar.
///
/// # Errors
/// Returns [Error::Unauthorized] if the cookie is missing, cannot be parsed,
/// or has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::Unauthorized)?;
    let token: Token = serde_json::from_str(cookie.value()).map_err(|_| Error::Unauthorized)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::Unauthorized);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{Error, user::UserID};

    use super::{get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie};

    fn get_test_jar() -> PrivateCookieJar {
        let hash = Sha512::digest("weLoveEels2");
        PrivateCookieJar::new(Key::from(&hash))
    }

    #[test]
    fn set_then_get_round_trips() {
        let jar = get_test_jar();

        let jar = set_auth_cookie(jar, UserID::new(42), Duration::minutes(5))
            .expect("Could not set auth cookie");
        let token = get_token_from_cookies(&jar).expect("Could not read token back");

        assert_eq!(token.user_id, UserID::new(42));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let jar = get_test_jar();

        let jar = set_auth_cookie(jar, UserID::new(1), Duration::minutes(-5))
            .expect("Could not set auth cookie");
        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthorized));
    }

    #[test]
    fn invalidated_cookie_is_unauthorized() {
        let jar = get_test_jar();

        let jar = set_auth_cookie(jar, UserID::new(1), Duration::minutes(5))
            .expect("Could not set auth cookie");
        let jar = invalidate_auth_cookie(jar);
        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthorized));
    }

    #[test]
    fn missing_cookie_is_unauthorized() {
        let jar = get_test_jar();

        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthorized));
    }
}
