// src/validation.rs
//! Input checks done by callers before anything reaches the store.
use crate::error::ValidationError;

pub const MIN_NOTE_PASSWORD_LEN: usize = 4;

pub fn note_fields(title: &str, content: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

/// Checks a password being set on a note against its confirmation.
pub fn new_note_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_NOTE_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_NOTE_PASSWORD_LEN));
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn credential_fields(title: &str, password: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() || password.trim().is_empty() {
        return Err(ValidationError::EmptyCredential);
    }
    Ok(())
}

pub fn username(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(trimmed)
}
