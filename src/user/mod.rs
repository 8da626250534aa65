//! Users of the application: the domain types, the user table, and the
//! registration endpoint.

mod db;
mod domain;
mod register;

pub use db::{create_user, create_user_table, get_user_by_email};
pub use domain::{PasswordHash, User, UserID};
pub use register::register_endpoint;
