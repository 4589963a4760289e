// src/export.rs
use crate::error::{StoreError, StoreResult};
use crate::models::Note;
use log;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `notes` as a pretty-printed JSON array to `dir/file_name` and
/// returns the path, ready to be handed to whatever shares it.
pub fn export_notes(notes: &[Note], dir: &Path, file_name: &str) -> StoreResult<PathBuf> {
    let json = serde_json::to_string_pretty(notes).map_err(|e| {
        let msg = format!("JSON serialization of export failed: {}", e);
        log::error!("export_notes: {}", msg);
        StoreError::Serialization(msg)
    })?;

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            log::error!("Failed to create export directory {:?}: {}", dir, e);
            StoreError::Io(e)
        })?;
    }

    let path = dir.join(file_name);
    fs::write(&path, json).map_err(|e| {
        log::error!("Failed to write export file {:?}: {}", path, e);
        StoreError::Io(e)
    })?;
    log::info!("Exported {} note(s) to {:?}", notes.len(), path);
    Ok(path)
}
