/*
 *  countdown/entry.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Countdown entries as configured by the host, and their validation
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Longest name kept for display, in characters
pub const MAX_NAME_CHARS: usize = 64;

/// Target date format used by the host's config
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a configured entry cannot take part in rotation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("not a countdown object: {0}")]
    Malformed(String),

    #[error("missing '{0}' field")]
    MissingField(&'static str),

    #[error("invalid target date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("duplicate id '{0}'")]
    DuplicateId(String),
}

/// Image reference as the host stores it.
///
/// Uploads arrive as a list of `{ "path": ... }` records of which only the
/// first is used; hand-written configs may give a bare path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    Path(String),
    Uploads(Vec<ImageUpload>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUpload {
    #[serde(default)]
    pub path: Option<String>,
}

impl ImageField {
    pub fn path(&self) -> Option<&str> {
        let p = match self {
            ImageField::Path(p) => Some(p.as_str()),
            ImageField::Uploads(list) => list.first().and_then(|u| u.path.as_deref()),
        };
        p.map(str::trim).filter(|p| !p.is_empty())
    }
}

/// One countdown entry exactly as it appears in the host's config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownEntryConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub target_date: Option<String>,
    pub image: Option<ImageField>,
    pub enabled: Option<bool>,
    pub display_order: Option<i64>,
}

/// A validated countdown entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownEntry {
    pub id: String,
    pub name: String,
    pub target_date: NaiveDate,
    pub image: Option<String>,
    pub enabled: bool,
    pub display_order: i64,

    /// Index in the host's list, used to break display_order ties
    pub position: usize,
}

impl CountdownEntry {
    /// Validate a raw JSON entry
    pub fn from_value(value: &Value, position: usize) -> Result<Self, EntryError> {
        if !value.is_object() {
            return Err(EntryError::Malformed(format!("expected object, got {}", kind_of(value))));
        }
        let raw: CountdownEntryConfig = serde_json::from_value(value.clone())
            .map_err(|e| EntryError::Malformed(e.to_string()))?;
        Self::from_config(&raw, position)
    }

    pub fn from_config(raw: &CountdownEntryConfig, position: usize) -> Result<Self, EntryError> {
        let id = non_blank(raw.id.as_deref()).ok_or(EntryError::MissingField("id"))?;
        let name = non_blank(raw.name.as_deref()).ok_or(EntryError::MissingField("name"))?;
        let date_str = non_blank(raw.target_date.as_deref())
            .ok_or(EntryError::MissingField("target_date"))?;
        let target_date = parse_target_date(date_str)?;

        let name = if name.chars().count() > MAX_NAME_CHARS {
            warn!("Countdown '{}' name longer than {} characters, truncating", id, MAX_NAME_CHARS);
            name.chars().take(MAX_NAME_CHARS).collect()
        } else {
            name.to_string()
        };

        Ok(Self {
            id: id.to_string(),
            name,
            target_date,
            image: raw.image.as_ref().and_then(|i| i.path()).map(str::to_string),
            enabled: raw.enabled.unwrap_or(true),
            display_order: raw.display_order.unwrap_or(0),
            position,
        })
    }
}

pub fn parse_target_date(value: &str) -> Result<NaiveDate, EntryError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| EntryError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
