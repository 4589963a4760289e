// src/biometric.rs
use crate::error::BiometricError;
use crate::kv::KeyValueStore;
use crate::settings::Settings;
use log;

pub const ACCESS_PROMPT: &str = "Authenticate to access passwords";
pub const ENABLE_PROMPT: &str = "Authenticate to enable biometric lock";

/// Device-level authentication. Anything other than `true` from
/// `authenticate` is a denial.
pub trait BiometricAuthenticator {
    fn is_supported(&self) -> bool;
    fn authenticate(&self, prompt: &str) -> bool;
}

/// Authenticator for hosts without a biometric API.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl BiometricAuthenticator for Unavailable {
    fn is_supported(&self) -> bool {
        false
    }

    fn authenticate(&self, _prompt: &str) -> bool {
        false
    }
}

/// Decides whether the password manager may be opened. A prompt is shown only
/// when the device supports it and the lock is enabled.
pub fn authorize_manager_access<S, A>(settings: &Settings<'_, S>, auth: &A) -> Result<(), BiometricError>
where
    S: KeyValueStore,
    A: BiometricAuthenticator + ?Sized,
{
    if !(auth.is_supported() && settings.biometric_enabled()) {
        return Ok(());
    }
    if auth.authenticate(ACCESS_PROMPT) {
        log::info!("Password manager unlocked by biometric authentication");
        Ok(())
    } else {
        log::warn!("Biometric authentication for the password manager failed");
        Err(BiometricError::AuthenticationFailed)
    }
}

/// Turns the biometric lock on or off. Enabling requires a successful prompt;
/// disabling does not. Returns the new state.
pub fn set_biometric_lock<S, A>(settings: &Settings<'_, S>, auth: &A, enable: bool) -> Result<bool, BiometricError>
where
    S: KeyValueStore,
    A: BiometricAuthenticator + ?Sized,
{
    if !auth.is_supported() {
        return Err(BiometricError::NotSupported);
    }
    if enable && !auth.authenticate(ENABLE_PROMPT) {
        log::warn!("Biometric authentication failed; lock left disabled");
        return Err(BiometricError::AuthenticationFailed);
    }
    if !settings.set_biometric_enabled(enable) {
        return Err(BiometricError::Persist);
    }
    Ok(enable)
}
