use lazy_static::lazy_static;
use regex::Regex;

use crate::users::model::{NewUser, UserUpdate};
use crate::UserError;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require(field: &'static str, value: &str) -> Result<(), UserError> {
    if value.trim().is_empty() {
        return Err(UserError::validation(field, "is required"));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), UserError> {
    if !is_valid_email(email) {
        return Err(UserError::validation("email", "is not a valid email address"));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), UserError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserError::validation(
            "password",
            "must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Field-level validation before a create. Runs every check the storage
/// layer cannot express besides the unique email index.
pub(crate) fn validate_new_user(user: &NewUser) -> Result<(), UserError> {
    require("first_name", &user.first_name)?;
    require("last_name", &user.last_name)?;
    require("email", &user.email)?;
    check_email(&user.email)?;
    check_password(&user.password)?;
    require("role", &user.role)?;
    require("profile_pic.public_id", &user.profile_pic.public_id)?;
    require("profile_pic.url", &user.profile_pic.url)?;
    require("graduation_year", &user.graduation_year)?;
    require("phone_number", &user.phone_number)?;
    require("course", &user.course)?;
    require("branch", &user.branch)?;
    require("address", &user.address)?;
    require("roll_number", &user.roll_number)?;
    require("date_of_birth", &user.date_of_birth)?;
    require("linkedin", &user.linkedin)?;
    Ok(())
}

/// Validation for partial updates: only supplied fields are checked.
pub(crate) fn validate_update(update: &UserUpdate) -> Result<(), UserError> {
    if let Some(email) = &update.email {
        require("email", email)?;
        check_email(email)?;
    }
    if let Some(password) = &update.password {
        check_password(password)?;
    }
    let required = [
        ("first_name", &update.first_name),
        ("last_name", &update.last_name),
        ("role", &update.role),
        ("graduation_year", &update.graduation_year),
        ("phone_number", &update.phone_number),
        ("course", &update.course),
        ("branch", &update.branch),
        ("address", &update.address),
        ("roll_number", &update.roll_number),
        ("date_of_birth", &update.date_of_birth),
        ("linkedin", &update.linkedin),
    ];
    for (field, value) in required {
        if let Some(value) = value {
            require(field, value)?;
        }
    }
    if let Some(pic) = &update.profile_pic {
        require("profile_pic.public_id", &pic.public_id)?;
        require("profile_pic.url", &pic.url)?;
    }
    Ok(())
}
