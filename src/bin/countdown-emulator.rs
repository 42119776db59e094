/*
 *  bin/countdown-emulator.rs
 *
 *  matrix-countdown display emulator - desktop testing tool
 *
 *  (c) 2020-26 Stuart Hunter
 *
 *  Drives the countdown plugin the way a signage host would and writes each
 *  rendered frame to a PNG, so layouts can be checked without a matrix.
 *
 *  Usage:
 *    cargo run --bin countdown-emulator -- --config countdown.yaml --frames 30
 *    cargo run --bin countdown-emulator -- --start 2026-12-24T23:59:00 --step-secs 30
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

use std::fs;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use matrix_countdown::config::{self, Cli};
use matrix_countdown::{
    Clock, CountdownPlugin, DisplayPlugin, FixedClock, FsImageSource, MonoFontRenderer,
    SystemClock,
};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_from(&cli).context("loading emulator config")?;

    if cli.dump_config {
        print!("{}", config::dump_config(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("countdown-emulator v{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let plugin_config = cfg.countdown_config();
    if let Err(e) = CountdownPlugin::validate_config(&plugin_config) {
        warn!("Countdown config has problems, continuing with what is usable: {}", e);
    }

    let images = FsImageSource::with_roots(cfg.image_roots().iter().cloned());
    let mut plugin = CountdownPlugin::new(
        cfg.plugin_id(),
        &plugin_config,
        Box::new(MonoFontRenderer::new()),
        Box::new(images),
    );

    let out_dir = cfg.output_dir();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let (width, height) = (cfg.width(), cfg.height());
    let step_secs = cfg.step_secs();
    let step = TimeDelta::milliseconds((step_secs * 1000.0).round() as i64);

    // a fixed start means simulated time, otherwise follow the wall clock
    let mut simulated = cfg.start().map(FixedClock::new);
    let system = SystemClock;

    info!(
        "Rendering {} frame(s) at {}x{} into {}",
        cfg.frames(),
        width,
        height,
        out_dir.display()
    );

    for n in 0..cfg.frames() {
        let now = match simulated.as_ref() {
            Some(clock) => clock.now(),
            None => system.now(),
        };

        let outcome = plugin.update(now);
        if outcome.cycle_complete {
            info!("Frame {}: rotation cycle complete", n);
        }

        let frame = plugin.render(width, height);
        let path = out_dir.join(format!("frame-{:04}.png", n));
        frame
            .to_rgb_image()
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;

        let info = plugin.info();
        info!(
            "{} {} -> {}",
            now.format("%Y-%m-%d %H:%M:%S"),
            info.current_id.as_deref().unwrap_or("(none)"),
            path.display()
        );

        match simulated.as_mut() {
            Some(clock) => clock.advance(step),
            None if n + 1 < cfg.frames() => thread::sleep(Duration::from_secs_f64(step_secs)),
            None => {}
        }
    }

    println!("{}", serde_json::to_string_pretty(&plugin.info())?);
    plugin.cleanup();
    Ok(())
}
