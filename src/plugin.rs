/*
 *  plugin.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host facing plugin interface and the countdown plugin
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

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::countdown::{CountdownEntry, CountdownSet, RotationOutcome};
use crate::display::{CountdownRenderer, Frame, ImageSource, Scene, TextRenderer};
use crate::settings::{self, ConfigError, PluginSettings};

/// Result of one update call
pub type UpdateOutcome = RotationOutcome;

/// What a signage host holds for each loaded plugin.
///
/// The host calls `update` then `render` on its own schedule, one call at a
/// time, and pushes every configuration change through `on_config_changed`.
pub trait DisplayPlugin: Send {
    fn plugin_id(&self) -> &str;

    /// Advance internal state to `now`
    fn update(&mut self, now: NaiveDateTime) -> UpdateOutcome;

    /// Draw the current state into a fresh frame
    fn render(&mut self, width: u32, height: u32) -> Frame;

    /// Replace the configuration; the new config is the whole truth
    fn on_config_changed(&mut self, config: &Value);

    /// How long the host should keep this plugin on screen
    fn display_duration(&self) -> TimeDelta;

    /// True when the plugin reports cycle completion through `update`
    fn supports_dynamic_duration(&self) -> bool {
        false
    }

    /// Called when the host brings the plugin back on screen
    fn reset_cycle_state(&mut self, _now: NaiveDateTime) {}

    /// Release cached resources before unload
    fn cleanup(&mut self) {}
}

/// Status snapshot for the host's UI and logs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub plugin_id: String,
    pub countdown_count: usize,
    pub valid_count: usize,
    pub enabled_count: usize,
    pub eligible_count: usize,
    pub current_index: Option<usize>,
    pub current_id: Option<String>,
    pub cached_images: usize,
    pub failed_images: usize,
    pub display_duration_secs: f64,
    pub show_expired: bool,
}

/// Rotating countdown display
pub struct CountdownPlugin {
    plugin_id: String,
    settings: PluginSettings,
    set: CountdownSet,
    renderer: CountdownRenderer,
}

impl CountdownPlugin {
    pub fn new(
        plugin_id: impl Into<String>,
        config: &Value,
        fonts: Box<dyn TextRenderer>,
        images: Box<dyn ImageSource>,
    ) -> Self {
        let plugin_id = plugin_id.into();
        let settings = PluginSettings::from_value(config, fonts.size_range());
        let set = CountdownSet::new(&settings.countdowns, settings.rotation_policy());

        info!(
            "Countdown plugin '{}' initialized with {} countdown(s), {} invalid",
            plugin_id,
            set.entries().len(),
            set.invalid().len()
        );

        Self {
            plugin_id,
            settings,
            set,
            renderer: CountdownRenderer::new(fonts, images),
        }
    }

    /// Strict config check for hosts, nothing is applied
    pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
        settings::validate_config(config)
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn countdowns(&self) -> &CountdownSet {
        &self.set
    }

    pub fn info(&self) -> PluginInfo {
        let cache = self.renderer.cache();
        PluginInfo {
            plugin_id: self.plugin_id.clone(),
            countdown_count: self.set.total_count(),
            valid_count: self.set.entries().len(),
            enabled_count: self.set.enabled_count(),
            eligible_count: self.set.eligible_count(),
            current_index: self.set.current_index(),
            current_id: self.set.current().map(|s| s.entry.id.clone()),
            cached_images: cache.len(),
            failed_images: cache.failed(),
            display_duration_secs: self.settings.display_duration_secs,
            show_expired: self.settings.show_expired,
        }
    }

    /// Drop panes whose reference no valid entry uses any more
    fn prune_images(&mut self) {
        let live: HashSet<&str> = self
            .set
            .entries()
            .iter()
            .filter_map(|e| e.image.as_deref())
            .collect();
        self.renderer.cache_mut().retain_references(&live);
    }
}

impl DisplayPlugin for CountdownPlugin {
    fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    fn update(&mut self, now: NaiveDateTime) -> UpdateOutcome {
        let outcome = self.set.tick(now);
        if outcome.rotated || outcome.resnapped {
            if let Some(sel) = self.set.current() {
                debug!("Showing countdown '{}': {}", sel.entry.id, sel.remaining);
            }
        }
        outcome
    }

    fn render(&mut self, width: u32, height: u32) -> Frame {
        let scene = Scene::from(self.set.current());
        self.renderer.render(&scene, &self.settings.style, width, height)
    }

    fn on_config_changed(&mut self, config: &Value) {
        let settings = PluginSettings::from_value(config, self.renderer.fonts().size_range());
        let old_count = self.set.total_count();
        let edited = edited_references(&self.settings.countdowns, &settings.countdowns);

        self.set.replace(&settings.countdowns, settings.rotation_policy());
        self.settings = settings;

        let cache = self.renderer.cache_mut();
        cache.retain_loaded();
        for reference in &edited {
            cache.invalidate(reference);
        }
        self.prune_images();

        info!(
            "Countdown config updated: {} -> {} countdown(s)",
            old_count,
            self.set.total_count()
        );
    }

    fn display_duration(&self) -> TimeDelta {
        self.settings.display_duration()
    }

    fn supports_dynamic_duration(&self) -> bool {
        true
    }

    fn reset_cycle_state(&mut self, now: NaiveDateTime) {
        debug!("Countdown rotation timer restarted");
        self.set.reset_timer(now);
    }

    fn cleanup(&mut self) {
        self.renderer.cache_mut().clear();
        self.set.clear_computed();
        info!("Countdown plugin '{}' cleaned up", self.plugin_id);
    }
}

/// Image references of entries that are new or differ from every old entry.
/// A re-upload usually arrives with an edited entry, so these are reloaded.
fn edited_references(old: &[Value], new: &[Value]) -> Vec<String> {
    new.iter()
        .enumerate()
        .filter(|(_, raw)| !old.contains(raw))
        .filter_map(|(position, raw)| CountdownEntry::from_value(raw, position).ok()?.image)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::display::{FsImageSource, MonoFontRenderer};

    fn plugin(config: Value) -> CountdownPlugin {
        CountdownPlugin::new(
            "countdown",
            &config,
            Box::new(MonoFontRenderer::new()),
            Box::new(FsImageSource::new()),
        )
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn config(b_enabled: bool) -> Value {
        json!({
            "display_duration": 5,
            "countdowns": [
                {"id": "a", "name": "A", "target_date": "2026-06-10"},
                {"id": "b", "name": "B", "target_date": "2026-06-11", "enabled": b_enabled},
                {"id": "bad", "name": "Bad"}
            ]
        })
    }

    #[test]
    fn test_plugin_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CountdownPlugin>();
    }

    #[test]
    fn test_info_reflects_state() {
        let mut p = plugin(config(true));
        assert!(p.supports_dynamic_duration());
        assert_eq!(p.display_duration(), TimeDelta::seconds(5));

        p.update(noon());
        let info = p.info();
        assert_eq!(info.countdown_count, 3);
        assert_eq!(info.valid_count, 2);
        assert_eq!(info.eligible_count, 2);
        assert_eq!(info.current_index, Some(0));
        assert_eq!(info.current_id.as_deref(), Some("a"));

        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["plugin_id"], "countdown");
        assert_eq!(v["cached_images"], 0);
    }

    #[test]
    fn test_config_change_applies_without_waiting() {
        let mut p = plugin(config(true));
        p.update(noon());
        p.update(noon() + TimeDelta::seconds(5));
        assert_eq!(p.info().current_id.as_deref(), Some("b"));

        p.on_config_changed(&config(false));
        assert_eq!(p.info().current_id.as_deref(), Some("a"));
        assert_eq!(p.info().enabled_count, 1);
    }

    #[test]
    fn test_cleanup_and_reset() {
        let mut p = plugin(config(true));
        p.update(noon());
        p.reset_cycle_state(noon() + TimeDelta::seconds(4));
        assert!(!p.update(noon() + TimeDelta::seconds(8)).rotated);
        assert!(p.update(noon() + TimeDelta::seconds(9)).rotated);

        p.cleanup();
        assert_eq!(p.info().current_index, None);
        assert!(p.update(noon()).resnapped);
    }

    #[test]
    fn test_edited_references() {
        let old = vec![
            json!({"id": "a", "name": "A", "target_date": "2026-06-10", "image": "a.png"}),
            json!({"id": "b", "name": "B", "target_date": "2026-06-10", "image": "b.png"}),
        ];
        let mut new = old.clone();
        new[1]["name"] = json!("Bee");
        new.push(json!({"id": "c", "name": "C", "target_date": "2026-06-10", "image": "c.png"}));
        new.push(json!({"id": "d", "name": "D", "target_date": "2026-06-10"}));

        assert_eq!(edited_references(&old, &new), ["b.png", "c.png"]);
        assert!(edited_references(&old, &old).is_empty());
    }

    #[test]
    fn test_validate_config_is_strict() {
        assert!(CountdownPlugin::validate_config(&config(true)).is_err());
        let mut ok = config(true);
        ok["countdowns"].as_array_mut().unwrap().pop();
        assert!(CountdownPlugin::validate_config(&ok).is_ok());
    }
}
