use thiserror::Error;

/// Failures surfaced by the user account core. Verification mismatch is not
/// an error: `verify_password` reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("email already registered")]
    DuplicateEmail,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    HashTask(#[from] tokio::task::JoinError),

    #[error("token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl UserError {
    pub fn validation(field: &'static str, message: &'static str) -> Self {
        Self::Validation { field, message }
    }
}
