// src/gate.rs
use crate::config::{Argon2Params, PasswordScheme};
use crate::crypto;
use crate::error::{AppResult, ValidationError};
use crate::models::Note;
use crate::validation;
use log;

/// Plaintext gate check: exact string equality with the stored password.
///
/// A protected note with no stored password never verifies.
pub fn verify(candidate: &str, note: &Note) -> bool {
    note.password.as_deref() == Some(candidate)
}

/// Checks `candidate` against whatever form the password was stored in: PHC
/// hashes are verified with Argon2 and anything else goes through `verify`,
/// whatever scheme is configured now.
pub fn verify_stored(candidate: &str, note: &Note) -> bool {
    match note.password.as_deref() {
        Some(stored) if crypto::is_password_hash(stored) => {
            crypto::verify_hashed_password(stored, candidate).unwrap_or_else(|e| {
                log::error!("Could not verify password for note {}: {}", note.id, e);
                false
            })
        }
        _ => verify(candidate, note),
    }
}

/// False for a protected note that has no usable password: no input can open it.
pub fn is_unlockable(note: &Note) -> bool {
    !note.is_protected() || note.password.as_deref().map_or(false, |p| !p.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Unlocked,
    /// Wrong password; the session stays locked and may be retried.
    Rejected,
    /// The session already ended; the submission was ignored.
    Closed,
}

/// One viewing session of a note.
///
/// `Locked -> Unlocked` on a correct password, `Locked -> Locked` on a wrong
/// one, `Locked -> Abandoned` when dismissed. There is no attempt limit.
pub struct UnlockSession<'a> {
    note: &'a Note,
    state: GateState,
    failed_attempts: u32,
}

impl<'a> UnlockSession<'a> {
    pub fn new(note: &'a Note) -> Self {
        let state = if note.is_protected() { GateState::Locked } else { GateState::Unlocked };
        if !is_unlockable(note) {
            log::warn!("Note {} is protected but has no password; it cannot be unlocked", note.id);
        }
        UnlockSession { note, state, failed_attempts: 0 }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Submits a candidate password. A blank candidate is a validation error
    /// and does not count as an attempt.
    pub fn submit(&mut self, candidate: &str) -> Result<Attempt, ValidationError> {
        if self.state != GateState::Locked {
            return Ok(Attempt::Closed);
        }
        if candidate.trim().is_empty() {
            return Err(ValidationError::EmptyCandidate);
        }

        if verify_stored(candidate, self.note) {
            log::info!("Note {} unlocked after {} failed attempt(s)", self.note.id, self.failed_attempts);
            self.state = GateState::Unlocked;
            Ok(Attempt::Unlocked)
        } else {
            self.failed_attempts += 1;
            log::info!("Incorrect password for note {} (attempt {})", self.note.id, self.failed_attempts);
            Ok(Attempt::Rejected)
        }
    }

    pub fn dismiss(&mut self) {
        if self.state == GateState::Locked {
            log::debug!("Unlock of note {} abandoned", self.note.id);
            self.state = GateState::Abandoned;
        }
    }

    /// The note, once the session is unlocked.
    pub fn note(&self) -> Option<&'a Note> {
        match self.state {
            GateState::Unlocked => Some(self.note),
            _ => None,
        }
    }
}

/// Turns on protection for `note` after validating the new password.
/// Under `Argon2` the stored value is a PHC hash instead of the plaintext.
pub fn protect(
    note: &mut Note,
    password: &str,
    confirm: &str,
    scheme: PasswordScheme,
    argon2_params: &Argon2Params,
) -> AppResult<()> {
    validation::new_note_password(password, confirm)?;
    let stored = match scheme {
        PasswordScheme::Plaintext => password.to_string(),
        PasswordScheme::Argon2 => crypto::hash_note_password(password, argon2_params)?,
    };
    note.is_password_protected = Some(true);
    note.password = Some(stored);
    log::info!("Password protection enabled for note {}", note.id);
    Ok(())
}

pub fn unprotect(note: &mut Note) {
    note.is_password_protected = Some(false);
    note.password = None;
    log::info!("Password protection removed from note {}", note.id);
}
