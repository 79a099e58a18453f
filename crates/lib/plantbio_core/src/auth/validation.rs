//! Input checks run before a form is sent to the backend.

use super::AuthError;
use crate::models::auth::Role;

/// Minimum password length accepted by the sign-in, sign-up and reset forms.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum length of an emailed verification code.
pub const MIN_VERIFICATION_CODE_LEN: usize = 4;

pub fn validate_sign_in(identifier: &str, password: &str) -> Result<(), AuthError> {
    if identifier.trim().is_empty() {
        return Err(AuthError::Validation("Account is required.".into()));
    }
    validate_password(password)
}

pub fn validate_sign_up(
    name: &str,
    identifier: &str,
    password: &str,
    role: &Role,
) -> Result<(), AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::Validation("Name is required.".into()));
    }
    if !matches!(role, Role::Teacher | Role::Student) {
        return Err(AuthError::Validation(format!(
            "Cannot sign up with role {role}; choose Teacher or Student."
        )));
    }
    validate_sign_in(identifier, password)
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }
    Ok(())
}

/// Accepts `local@domain.tld` with no whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::Validation(format!("{email:?} is not a valid email address."));
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if local.is_empty() || host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password_reset(
    email: &str,
    verification_code: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    validate_email(email)?;
    if verification_code.trim().chars().count() < MIN_VERIFICATION_CODE_LEN {
        return Err(AuthError::Validation(format!(
            "Verification code must be at least {MIN_VERIFICATION_CODE_LEN} characters."
        )));
    }
    validate_password(new_password)
}
