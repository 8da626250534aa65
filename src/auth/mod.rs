//! Session handling: the auth cookie, the guard middleware, and the log
//! in/out endpoints.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::log_in_endpoint;
pub use log_out::log_out_endpoint;
pub use middleware::auth_guard;
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
