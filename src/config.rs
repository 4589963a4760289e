// src/config.rs
use serde::{Serialize, Deserialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use log::{info, warn};
use toml;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "notes_export.json";

/// Cost settings for hashing note passwords under `PasswordScheme::Argon2`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory in KiB.
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Argon2Params {
            m_cost: 19456, // 19 MiB
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// How note passwords are kept at rest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Stored as typed, compared by string equality.
    #[default]
    Plaintext,
    /// Stored as an Argon2id PHC hash.
    Argon2,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Overrides the platform data directory when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub note_password_scheme: PasswordScheme,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default)]
    pub argon2_params: Argon2Params,
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            note_password_scheme: PasswordScheme::default(),
            export_file_name: default_export_file_name(),
            argon2_params: Argon2Params::default(),
        }
    }
}

impl Config {
    /// Where the key-value files live: the explicit override, then the
    /// configured `data_dir`, then the platform data directory, then
    /// `./notevault-data`.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => {
                warn!("Could not determine data directory. Using ./notevault-data");
                PathBuf::from("notevault-data")
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "NoteVault", "NoteVault")
}

fn get_config_path() -> Option<PathBuf> {
    project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("notevault_config.toml"))
}

/// Writes `config` to `config_path` so users have a file to edit.
fn write_config(config_path: &Path, config: &Config) -> Result<(), String> {
    if let Some(parent_dir) = config_path.parent().filter(|dir| !dir.exists()) {
        fs::create_dir_all(parent_dir)
            .map_err(|e| format!("cannot create notevault config dir {:?}: {}", parent_dir, e))?;
    }
    let body = toml::to_string_pretty(config).map_err(|e| format!("cannot encode notevault config: {}", e))?;
    fs::write(config_path, body).map_err(|e| format!("cannot write {:?}: {}", config_path, e))?;
    info!("Wrote notevault defaults to {:?}", config_path);
    Ok(())
}

/// Reads the config at `config_path`, writing the default there when the file
/// does not exist. Any read or parse problem falls back to the default.
fn load_config_from(config_path: &Path) -> Config {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No notevault config at {:?}; starting from defaults", config_path);
            let config = Config::default();
            if let Err(e) = write_config(config_path, &config) {
                warn!("Keeping notevault defaults in memory only: {}", e);
            }
            return config;
        }
        Err(e) => {
            warn!("Notevault config {:?} is unreadable ({}); using defaults", config_path, e);
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            info!(
                "Notevault config loaded from {:?} (note passwords: {:?})",
                config_path, config.note_password_scheme
            );
            config
        }
        Err(e) => {
            warn!("Notevault config {:?} is invalid ({}); using defaults", config_path, e);
            Config::default()
        }
    }
}

pub fn load_config() -> Config {
    match get_config_path() {
        Some(config_path) => load_config_from(&config_path),
        None => {
            warn!("No config directory on this platform; notevault runs on defaults");
            Config::default()
        }
    }
}
