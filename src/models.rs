// src/models.rs
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use chrono::{Local, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;
use crate::error::ValidationError;

pub const NOTES_KEY: &str = "@notes_v1";
pub const CREDENTIALS_KEY: &str = "saved_passwords";
pub const DEFAULT_CATEGORY: &str = "General";

/// A record kept in one of the persisted collections.
pub trait Record: Serialize + DeserializeOwned + Clone + Send {
    /// Key the whole collection is stored under.
    const STORAGE_KEY: &'static str;
    /// Human-readable name for log lines.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Creation-date string, e.g. `10/19/2026`.
pub fn display_date() -> String {
    Local::now().format("%-m/%-d/%Y").to_string()
}

/// Modification timestamp, e.g. `2026-10-19T09:28:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The five accent colors a note may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteColor {
    #[default]
    Pink,
    Green,
    Blue,
    Yellow,
    Purple,
}

impl NoteColor {
    pub const ALL: [NoteColor; 5] = [
        NoteColor::Pink,
        NoteColor::Green,
        NoteColor::Blue,
        NoteColor::Yellow,
        NoteColor::Purple,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            NoteColor::Pink => "#ffb3ba",
            NoteColor::Green => "#baffc9",
            NoteColor::Blue => "#bae1ff",
            NoteColor::Yellow => "#ffffba",
            NoteColor::Purple => "#e6baff",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NoteColor::Pink => "pink",
            NoteColor::Green => "green",
            NoteColor::Blue => "blue",
            NoteColor::Yellow => "yellow",
            NoteColor::Purple => "purple",
        }
    }

    pub fn from_hex(hex: &str) -> Option<NoteColor> {
        NoteColor::ALL.into_iter().find(|c| c.hex().eq_ignore_ascii_case(hex))
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoteColor {
    type Err = ValidationError;

    /// Accepts a palette name (`green`) or its hex code (`#baffc9`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NoteColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .or_else(|| NoteColor::from_hex(s))
            .ok_or_else(|| ValidationError::UnknownColor(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub last_modified: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_password_protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Note {
    pub fn new(title: &str, content: &str, color: NoteColor) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            date: display_date(),
            last_modified: timestamp(),
            color: color.hex().to_string(),
            is_password_protected: None,
            password: None,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.is_password_protected.unwrap_or(false)
    }

    /// Stamps `last_modified` with the current time.
    pub fn touch(&mut self) {
        self.last_modified = timestamp();
    }

    /// Case-insensitive substring match on title or content.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }
}

impl Record for Note {
    const STORAGE_KEY: &'static str = NOTES_KEY;
    const KIND: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Notes matching `query`, in their stored order.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    notes.iter().filter(|n| n.matches(query)).collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavedCredential {
    pub id: String,
    pub title: String,
    pub password: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl SavedCredential {
    pub fn new(title: &str, password: &str, category: Option<&str>) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            password: password.trim().to_string(),
            date: display_date(),
            category: Some(normalize_category(category)),
            last_modified: Some(timestamp()),
        }
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Blank or missing categories collapse to `General`.
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

impl Record for SavedCredential {
    const STORAGE_KEY: &'static str = CREDENTIALS_KEY;
    const KIND: &'static str = "credential";

    fn id(&self) -> &str {
        &self.id
    }
}
