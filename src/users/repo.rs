use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::users::model::{Credentials, NewUser, ResetLookup, User, UserUpdate};
use crate::users::password;
use crate::users::reset::{self, ResetToken};
use crate::users::validate;
use crate::UserError;

const PUBLIC_COLUMNS: &str = "id, first_name, last_name, email, role, profile_pic, \
     graduation_year, phone_number, course, branch, address, roll_number, \
     date_of_birth, linkedin, created_at";

fn map_db_err(e: sqlx::Error) -> UserError {
    match &e {
        // 23505: postgres unique_violation, here only the email index
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            UserError::DuplicateEmail
        }
        _ => UserError::Database(e),
    }
}

/// Validates the record, hashes the password off-thread, and inserts.
/// The plaintext password never reaches the database.
pub async fn create(db: &PgPool, new_user: NewUser) -> Result<User, UserError> {
    validate::validate_new_user(&new_user)?;
    let password_hash = password::hash_blocking(new_user.password.clone()).await?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (
            first_name, last_name, email, password_hash, role, profile_pic,
            graduation_year, phone_number, course, branch, address,
            roll_number, date_of_birth, linkedin
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {PUBLIC_COLUMNS}
        "#
    ))
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(&password_hash)
    .bind(&new_user.role)
    .bind(Json(&new_user.profile_pic))
    .bind(&new_user.graduation_year)
    .bind(&new_user.phone_number)
    .bind(&new_user.course)
    .bind(&new_user.branch)
    .bind(&new_user.address)
    .bind(&new_user.roll_number)
    .bind(&new_user.date_of_birth)
    .bind(&new_user.linkedin)
    .fetch_one(db)
    .await
    .map_err(map_db_err)?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, UserError> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1"#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, UserError> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {PUBLIC_COLUMNS} FROM users WHERE email = $1"#
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Credential-shaped read, for login flows that need to verify a password.
pub async fn find_by_email_with_credentials(
    db: &PgPool,
    email: &str,
) -> Result<Option<Credentials>, UserError> {
    let creds = sqlx::query_as::<_, Credentials>(
        r#"SELECT id, email, password_hash FROM users WHERE email = $1"#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(creds)
}

pub async fn find_by_id_with_credentials(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<Credentials>, UserError> {
    let creds = sqlx::query_as::<_, Credentials>(
        r#"SELECT id, email, password_hash FROM users WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(creds)
}

/// Partial update. A `None` password leaves `password_hash` untouched via
/// COALESCE, so unrelated edits never re-hash; a `Some` password is hashed
/// here, before the statement runs.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    update: UserUpdate,
) -> Result<Option<User>, UserError> {
    validate::validate_update(&update)?;
    let password_hash = match &update.password {
        Some(plain) => Some(password::hash_blocking(plain.clone()).await?),
        None => None,
    };

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            password_hash = COALESCE($5, password_hash),
            role = COALESCE($6, role),
            profile_pic = COALESCE($7, profile_pic),
            graduation_year = COALESCE($8, graduation_year),
            phone_number = COALESCE($9, phone_number),
            course = COALESCE($10, course),
            branch = COALESCE($11, branch),
            address = COALESCE($12, address),
            roll_number = COALESCE($13, roll_number),
            date_of_birth = COALESCE($14, date_of_birth),
            linkedin = COALESCE($15, linkedin)
        WHERE id = $1
        RETURNING {PUBLIC_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.email)
    .bind(&password_hash)
    .bind(&update.role)
    .bind(update.profile_pic.as_ref().map(Json))
    .bind(&update.graduation_year)
    .bind(&update.phone_number)
    .bind(&update.course)
    .bind(&update.branch)
    .bind(&update.address)
    .bind(&update.roll_number)
    .bind(&update.date_of_birth)
    .bind(&update.linkedin)
    .fetch_optional(db)
    .await
    .map_err(map_db_err)?;

    Ok(user)
}

/// Persists a generated reset token: only the SHA-256 digest and the expiry
/// are written. Overwrites any previous pending reset.
pub async fn store_reset_token(
    db: &PgPool,
    user_id: Uuid,
    token: &ResetToken,
) -> Result<(), UserError> {
    sqlx::query(
        r#"
        UPDATE users
        SET reset_password_token = $2, reset_password_expire = $3
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&token.hashed)
    .bind(token.expires_at)
    .fetch_one(db)
    .await?;
    Ok(())
}

/// Starts a password reset for the account behind `email`, if any. Returns
/// the freshly generated token so the caller can deliver the plaintext; the
/// stored record keeps only its digest.
pub async fn begin_password_reset(
    db: &PgPool,
    email: &str,
) -> Result<Option<ResetToken>, UserError> {
    let user = match find_by_email(db, email).await? {
        Some(user) => user,
        None => return Ok(None),
    };
    let token = ResetToken::generate();
    store_reset_token(db, user.id, &token).await?;
    info!(user_id = %user.id, "password reset token issued");
    Ok(Some(token))
}

/// Looks up a pending reset by candidate plaintext token. The candidate is
/// digested and matched against the stored hash; the expiry is returned for
/// the caller to check, not filtered here.
pub async fn find_by_reset_token(
    db: &PgPool,
    candidate: &str,
) -> Result<Option<ResetLookup>, UserError> {
    let digest = reset::hash_token(candidate);
    let lookup = sqlx::query_as::<_, ResetLookup>(
        r#"
        SELECT id, email, reset_password_expire
        FROM users
        WHERE reset_password_token = $1
        "#,
    )
    .bind(digest)
    .fetch_optional(db)
    .await?;
    Ok(lookup)
}

/// Completes a reset: stores the hash of the new password and clears both
/// reset columns, returning the record to its no-reset-pending state.
pub async fn update_password(
    db: &PgPool,
    user_id: Uuid,
    new_password: &str,
) -> Result<(), UserError> {
    if new_password.len() < validate::MIN_PASSWORD_LEN {
        return Err(UserError::validation(
            "password",
            "must be at least 6 characters",
        ));
    }
    let password_hash = password::hash_blocking(new_password.to_owned()).await?;
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2,
            reset_password_token = NULL,
            reset_password_expire = NULL
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&password_hash)
    .fetch_one(db)
    .await?;
    Ok(())
}
