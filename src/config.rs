/*
 *  config.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Emulator host configuration - defaults, YAML file, CLI overrides
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

use chrono::NaiveDateTime;
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 64;
pub const DEFAULT_HEIGHT: u32 = 32;
pub const DEFAULT_PLUGIN_ID: &str = "countdown";
pub const DEFAULT_OUTPUT_DIR: &str = "frames";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Emulator configuration. The `countdown` block is handed to the plugin
/// untouched, exactly as a signage host would store it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub plugin_id: Option<String>,
    pub display: Option<DisplayConfig>,
    pub run: Option<RunConfig>,
    /// extra directories searched for relative image references
    pub image_roots: Option<Vec<PathBuf>>,
    pub countdown: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunConfig {
    pub frames: Option<u32>,
    pub step_secs: Option<f64>,
    /// simulated start, system clock when absent
    pub start: Option<NaiveDateTime>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn width(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.width).unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.height).unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn frames(&self) -> u32 {
        self.run.as_ref().and_then(|r| r.frames).unwrap_or(1)
    }

    pub fn step_secs(&self) -> f64 {
        self.run.as_ref().and_then(|r| r.step_secs).unwrap_or(1.0)
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.run.as_ref().and_then(|r| r.start)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.run
            .as_ref()
            .and_then(|r| r.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn plugin_id(&self) -> &str {
        self.plugin_id.as_deref().unwrap_or(DEFAULT_PLUGIN_ID)
    }

    pub fn image_roots(&self) -> &[PathBuf] {
        self.image_roots.as_deref().unwrap_or(&[])
    }

    /// Plugin config, an empty object when none was given
    pub fn countdown_config(&self) -> Value {
        self.countdown.clone().unwrap_or_else(|| Value::Object(Default::default()))
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "countdown-emulator", about = "Render countdown frames to PNG")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// number of frames to render
    #[arg(long)]
    pub frames: Option<u32>,
    /// seconds between frames
    #[arg(long)]
    pub step_secs: Option<f64>,
    /// simulated start, e.g. 2026-12-24T18:00:00
    #[arg(long)]
    pub start: Option<NaiveDateTime>,
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,
    /// extra image search directory, repeatable
    #[arg(long = "image-root", value_hint = ValueHint::DirPath)]
    pub image_roots: Vec<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML, merge, apply `cli`, validate.
pub fn load_from(cli: &Cli) -> Result<Config, HostConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(HostConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump_config(cfg: &Config) -> Result<String, HostConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/matrix-countdown/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/matrix-countdown/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/matrix-countdown.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["countdown.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, HostConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.plugin_id.is_some()      { dst.plugin_id = src.plugin_id; }
    if src.image_roots.is_some()    { dst.image_roots = src.image_roots; }
    // the plugin block is replaced whole, never merged key by key
    if src.countdown.is_some()      { dst.countdown = src.countdown; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.run, src.run) {
        (None, Some(c)) => dst.run = Some(c),
        (Some(d), Some(s)) => merge_run(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
}

fn merge_run(dst: &mut RunConfig, src: RunConfig) {
    if src.frames.is_some()      { dst.frames = src.frames; }
    if src.step_secs.is_some()   { dst.step_secs = src.step_secs; }
    if src.start.is_some()       { dst.start = src.start; }
    if src.output_dir.is_some()  { dst.output_dir = src.output_dir; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if !cli.image_roots.is_empty() {
        cfg.image_roots
            .get_or_insert_with(Vec::new)
            .extend(cli.image_roots.iter().cloned());
    }

    if cli.width.is_some() || cli.height.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.width.is_some()       { display.width = cli.width; }
        if cli.height.is_some()      { display.height = cli.height; }
    }

    let any_run = cli.frames.is_some()
        || cli.step_secs.is_some()
        || cli.start.is_some()
        || cli.output_dir.is_some();
    if any_run {
        let run = cfg.run.get_or_insert_with(RunConfig::default);
        if cli.frames.is_some()      { run.frames = cli.frames; }
        if cli.step_secs.is_some()   { run.step_secs = cli.step_secs; }
        if cli.start.is_some()       { run.start = cli.start; }
        if cli.output_dir.is_some()  { run.output_dir = cli.output_dir.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), HostConfigError> {
    if cfg.width() == 0 || cfg.height() == 0 {
        return Err(HostConfigError::Validation("display width/height must be > 0".into()));
    }
    if cfg.frames() == 0 {
        return Err(HostConfigError::Validation("run frames must be > 0".into()));
    }
    let step = cfg.step_secs();
    if !step.is_finite() || step < 0.0 {
        return Err(HostConfigError::Validation("run step_secs must be >= 0".into()));
    }
    if let Some(c) = cfg.countdown.as_ref() {
        if !c.is_object() {
            return Err(HostConfigError::Validation("countdown must be a mapping".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
log_level: debug
display:
  width: 128
run:
  frames: 3
  start: "2026-12-24T18:00:00"
countdown:
  display_duration: 10
  countdowns:
    - id: xmas
      name: Christmas
      target_date: "2026-12-25"
"#;

    fn yaml_file(body: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_yaml_then_cli_precedence() {
        let f = yaml_file(YAML);
        let path = f.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["countdown-emulator", "--config", path, "--frames", "7", "--height", "16"])
            .unwrap();
        let cfg = load_from(&cli).unwrap();

        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!((cfg.width(), cfg.height()), (128, 16));
        assert_eq!(cfg.frames(), 7);
        assert_eq!(cfg.step_secs(), 1.0);
        assert_eq!(cfg.start().unwrap().to_string(), "2026-12-24 18:00:00");

        let plugin = cfg.countdown_config();
        assert_eq!(plugin["display_duration"], 10);
        assert_eq!(plugin["countdowns"][0]["id"], "xmas");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let cli = Cli::try_parse_from(["countdown-emulator", "--config", "/nonexistent/countdown.yaml"]).unwrap();
        assert!(matches!(load_from(&cli), Err(HostConfigError::Validation(_))));
    }

    #[test]
    fn test_validation() {
        let mut cfg = Config::default();
        assert!(validate(&cfg).is_ok());

        cfg.display = Some(DisplayConfig { width: Some(0), height: None });
        assert!(validate(&cfg).is_err());

        cfg.display = None;
        cfg.countdown = Some(Value::from(3));
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_dump_round_trips() {
        let cfg = read_yaml(yaml_file(YAML).path()).unwrap();
        let text = dump_config(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back.frames(), 3);
        assert_eq!(back.countdown, cfg.countdown);
    }
}
