/*
 *  settings.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Plugin settings as delivered by the host, lenient and strict readers
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

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::TimeDelta;
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::countdown::{CountdownEntry, EntryError, RotationPolicy};
use crate::display::color::{
    parse_color, DEFAULT_BACKGROUND, DEFAULT_NAME_COLOR, DEFAULT_VALUE_COLOR,
};
use crate::display::renderer::{RenderStyle, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::display::{FontSpec, ImageFit};

pub const DEFAULT_DISPLAY_DURATION_SECS: f64 = 15.0;
pub const DISPLAY_DURATION_RANGE: RangeInclusive<f64> = 1.0..=3600.0;

/// Problems found by the strict validator
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("plugin config must be an object")]
    NotAnObject,

    #[error("'countdowns' must be a list")]
    CountdownsNotAList,

    #[error("countdown #{position}: {source}")]
    Entry {
        position: usize,
        #[source]
        source: EntryError,
    },

    #[error("'{key}' {reason}")]
    Setting { key: &'static str, reason: String },
}

/// Plugin config exactly as the host stores it. Every field is kept as raw
/// JSON so one bad value cannot reject the rest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub display_duration: Option<Value>,
    pub show_expired: Option<Value>,
    pub fit_to_display: Option<Value>,
    pub preserve_aspect_ratio: Option<Value>,
    pub font_family: Option<Value>,
    pub font_size: Option<Value>,
    pub name_font_size: Option<Value>,
    pub font_color: Option<Value>,
    pub name_font_color: Option<Value>,
    pub background_color: Option<Value>,
    pub countdowns: Option<Value>,
}

impl SettingsConfig {
    /// Non-objects and undecodable configs read as empty
    pub fn from_value(config: &Value) -> Self {
        if !config.is_object() {
            warn!("Plugin config is not an object, using defaults");
            return Self::default();
        }
        serde_json::from_value(config.clone()).unwrap_or_else(|e| {
            warn!("Plugin config unreadable ({}), using defaults", e);
            Self::default()
        })
    }
}

/// Effective plugin settings.
///
/// Built leniently: anything unusable is replaced by its default with a
/// warning so the plugin always has something to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSettings {
    pub display_duration_secs: f64,
    pub show_expired: bool,
    pub font_family: String,
    pub font_size: u32,
    pub name_font_size: u32,
    pub style: RenderStyle,
    pub countdowns: Vec<Value>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            display_duration_secs: DEFAULT_DISPLAY_DURATION_SECS,
            show_expired: false,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            name_font_size: DEFAULT_FONT_SIZE,
            style: RenderStyle::default(),
            countdowns: Vec::new(),
        }
    }
}

impl PluginSettings {
    /// Read settings from the host's config object, clamping font sizes
    /// into `font_sizes`
    pub fn from_value(config: &Value, font_sizes: RangeInclusive<u32>) -> Self {
        Self::from_config(&SettingsConfig::from_value(config), font_sizes)
    }

    pub fn from_config(raw: &SettingsConfig, font_sizes: RangeInclusive<u32>) -> Self {
        let display_duration_secs = duration(raw.display_duration.as_ref());
        let show_expired = flag(raw.show_expired.as_ref(), "show_expired", false);
        let fit_to_display = flag(raw.fit_to_display.as_ref(), "fit_to_display", true);
        let preserve_aspect_ratio =
            flag(raw.preserve_aspect_ratio.as_ref(), "preserve_aspect_ratio", true);

        let font_family = match &raw.font_family {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            None | Some(Value::Null) => DEFAULT_FONT_FAMILY.to_string(),
            Some(other) => {
                warn!("Invalid font_family {}, using {}", other, DEFAULT_FONT_FAMILY);
                DEFAULT_FONT_FAMILY.to_string()
            }
        };
        let font_size = read_font_size(raw.font_size.as_ref(), "font_size", &font_sizes);
        let name_font_size = read_font_size(raw.name_font_size.as_ref(), "name_font_size", &font_sizes);

        let style = RenderStyle {
            value_font: FontSpec::new(font_family.clone(), font_size),
            value_color: parse_color(raw.font_color.as_ref(), DEFAULT_VALUE_COLOR, "font"),
            name_font: FontSpec::new(font_family.clone(), name_font_size),
            name_color: parse_color(raw.name_font_color.as_ref(), DEFAULT_NAME_COLOR, "name font"),
            background: parse_color(raw.background_color.as_ref(), DEFAULT_BACKGROUND, "background"),
            fit: ImageFit::from_flags(fit_to_display, preserve_aspect_ratio),
        };

        let countdowns = match &raw.countdowns {
            Some(Value::Array(list)) => list.clone(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!("Countdowns is not a list ({}), defaulting to empty", kind(other));
                Vec::new()
            }
        };

        Self {
            display_duration_secs,
            show_expired,
            font_family,
            font_size,
            name_font_size,
            style,
            countdowns,
        }
    }

    pub fn display_duration(&self) -> TimeDelta {
        TimeDelta::milliseconds((self.display_duration_secs * 1000.0).round() as i64)
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy {
            display_duration: self.display_duration(),
            show_expired: self.show_expired,
        }
    }
}

/// Strict check a host runs before accepting a config
pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let map = config.as_object().ok_or(ConfigError::NotAnObject)?;

    if let Some(v) = map.get("display_duration") {
        match number(v) {
            Some(n) if DISPLAY_DURATION_RANGE.contains(&n) => {}
            _ => {
                return Err(ConfigError::Setting {
                    key: "display_duration",
                    reason: format!("must be a number of seconds in 1..=3600, got {}", v),
                })
            }
        }
    }

    for key in ["show_expired", "fit_to_display", "preserve_aspect_ratio"] {
        if let Some(v) = map.get(key) {
            if !v.is_boolean() {
                return Err(ConfigError::Setting { key, reason: format!("must be true or false, got {}", v) });
            }
        }
    }

    let countdowns = match map.get("countdowns") {
        None => return Ok(()),
        Some(Value::Array(list)) => list,
        Some(_) => return Err(ConfigError::CountdownsNotAList),
    };

    let mut seen = HashSet::new();
    for (position, raw) in countdowns.iter().enumerate() {
        let entry = CountdownEntry::from_value(raw, position)
            .map_err(|source| ConfigError::Entry { position, source })?;
        if !seen.insert(entry.id.clone()) {
            return Err(ConfigError::Entry { position, source: EntryError::DuplicateId(entry.id) });
        }
    }
    Ok(())
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn duration(v: Option<&Value>) -> f64 {
    let Some(v) = v.filter(|v| !v.is_null()) else {
        return DEFAULT_DISPLAY_DURATION_SECS;
    };
    match number(v) {
        Some(n) => {
            let clamped = n.clamp(*DISPLAY_DURATION_RANGE.start(), *DISPLAY_DURATION_RANGE.end());
            if clamped != n {
                warn!("display_duration {} out of range, using {}", n, clamped);
            }
            clamped
        }
        None => {
            warn!("Invalid display_duration {}, using {}", v, DEFAULT_DISPLAY_DURATION_SECS);
            DEFAULT_DISPLAY_DURATION_SECS
        }
    }
}

fn flag(v: Option<&Value>, key: &str, default: bool) -> bool {
    match v {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(other) => {
            warn!("Invalid {} {}, using {}", key, other, default);
            default
        }
    }
}

fn read_font_size(v: Option<&Value>, key: &str, range: &RangeInclusive<u32>) -> u32 {
    let wanted = match v {
        None | Some(Value::Null) => DEFAULT_FONT_SIZE as f64,
        Some(v) => number(v).unwrap_or_else(|| {
            warn!("Invalid {} {}, using {}", key, v, DEFAULT_FONT_SIZE);
            DEFAULT_FONT_SIZE as f64
        }),
    };
    let size = (wanted.round().max(0.0) as u32).clamp(*range.start(), *range.end());
    if size as f64 != wanted.round() {
        warn!("{} {} not supported, using {}", key, wanted, size);
    }
    size
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
