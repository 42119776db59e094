/*
 *  lib.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
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

//! Countdown display plugin for LED matrix signage hosts.
//!
//! A host builds a [`CountdownPlugin`] from its JSON config plus a text and
//! an image service, then drives it with `update(now)` and
//! `render(width, height)`. Entries rotate on a timer; each frame shows the
//! entry image on the left third and the name over the time remaining on
//! the rest of the matrix.

pub mod clock;
pub mod config;
pub mod countdown;
pub mod display;
pub mod plugin;
pub mod settings;
pub mod vframebuf;

pub use clock::{Clock, FixedClock, SystemClock};
pub use countdown::{CountdownEntry, CountdownSet, TimeRemaining};
pub use display::{Frame, FsImageSource, ImageSource, MonoFontRenderer, TextRenderer};
pub use plugin::{CountdownPlugin, DisplayPlugin, PluginInfo, UpdateOutcome};
pub use settings::{validate_config, ConfigError, PluginSettings, SettingsConfig};
