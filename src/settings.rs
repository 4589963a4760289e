// src/settings.rs
use crate::kv::KeyValueStore;
use log;

pub const BIOMETRIC_ENABLED_KEY: &str = "biometric_enabled";
pub const USERNAME_KEY: &str = "user_name";

/// Scalar preferences kept next to the collections, one key each.
pub struct Settings<'a, S: KeyValueStore> {
    kv: &'a S,
}

impl<'a, S: KeyValueStore> Settings<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Settings { kv }
    }

    /// False when unset, unreadable, or not a JSON boolean.
    pub fn biometric_enabled(&self) -> bool {
        match self.kv.get(BIOMETRIC_ENABLED_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(raw.trim()).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable biometric flag {:?}: {}", raw, e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                log::error!("Error loading biometric settings: {}", e);
                false
            }
        }
    }

    pub fn set_biometric_enabled(&self, enabled: bool) -> bool {
        match self.kv.set(BIOMETRIC_ENABLED_KEY, if enabled { "true" } else { "false" }) {
            Ok(()) => {
                log::info!("Biometric lock {}", if enabled { "enabled" } else { "disabled" });
                true
            }
            Err(e) => {
                log::error!("Error saving biometric settings: {}", e);
                false
            }
        }
    }

    /// The display name, if one was saved. Older raw-text values are accepted.
    pub fn username(&self) -> Option<String> {
        match self.kv.get(USERNAME_KEY) {
            Ok(Some(raw)) => {
                let name = serde_json::from_str::<String>(&raw).unwrap_or(raw);
                if name.trim().is_empty() {
                    None
                } else {
                    Some(name)
                }
            }
            Ok(None) => None,
            Err(e) => {
                log::error!("Error checking username: {}", e);
                None
            }
        }
    }

    /// Stores `name` trimmed. Callers validate non-emptiness first.
    pub fn set_username(&self, name: &str) -> bool {
        let encoded = match serde_json::to_string(name.trim()) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("Error encoding username: {}", e);
                return false;
            }
        };
        match self.kv.set(USERNAME_KEY, &encoded) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error saving username: {}", e);
                false
            }
        }
    }
}
