use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::password;
use crate::UserError;

/// Uploaded avatar reference (object-store id plus public URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePic {
    pub public_id: String,
    pub url: String,
}

/// Public view of a user record. This is what default queries return: it
/// carries no password hash and no reset-token columns, so code holding a
/// `User` cannot leak either.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub profile_pic: Json<ProfilePic>,
    pub graduation_year: String,
    pub phone_number: String,
    pub course: String,
    pub branch: String,
    pub address: String,
    pub roll_number: String,
    pub date_of_birth: String,
    pub linkedin: String,
    pub created_at: OffsetDateTime,
}

/// Credential view, returned only by the `*_with_credentials` queries.
/// Password verification lives here so it cannot be called on a record
/// whose hash was never loaded.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl Credentials {
    /// Compares a candidate plaintext against the stored bcrypt hash on a
    /// blocking worker thread. Mismatch is `Ok(false)`, never an error.
    pub async fn verify_password(&self, candidate: &str) -> Result<bool, UserError> {
        password::verify_blocking(candidate.to_owned(), self.password_hash.clone()).await
    }
}

/// All fields required to register a user. `password` is plaintext here;
/// the repo hashes it before it reaches storage.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub profile_pic: ProfilePic,
    pub graduation_year: String,
    pub phone_number: String,
    pub course: String,
    pub branch: String,
    pub address: String,
    pub roll_number: String,
    pub date_of_birth: String,
    pub linkedin: String,
}

/// Partial update. `None` means "leave the column untouched"; in particular
/// a `None` password leaves the stored hash byte-for-byte unchanged, so
/// unrelated profile edits never re-hash.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub profile_pic: Option<ProfilePic>,
    pub graduation_year: Option<String>,
    pub phone_number: Option<String>,
    pub course: Option<String>,
    pub branch: Option<String>,
    pub address: Option<String>,
    pub roll_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub linkedin: Option<String>,
}

/// Result of looking up a pending password reset. The expiry is returned to
/// the caller; this crate does not reject expired tokens itself.
#[derive(Debug, Clone, FromRow)]
pub struct ResetLookup {
    pub id: Uuid,
    pub email: String,
    pub reset_password_expire: OffsetDateTime,
}
