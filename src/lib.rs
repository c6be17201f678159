//! Account core for the alumnet directory: the user record, its validation,
//! password hashing, session-token issuance and password-reset tokens.
//! HTTP handlers and mail delivery live elsewhere and call into this crate.

pub mod config;
pub mod db;
pub mod error;
pub mod users;

pub use error::UserError;
