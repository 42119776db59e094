/*
 *  tests/rotation_integration.rs
 *
 *  Integration tests for countdown selection and rotation
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 */

use chrono::{NaiveDate, TimeDelta};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use serde_json::{json, Value};

use matrix_countdown::{
    Clock, CountdownPlugin, DisplayPlugin, FixedClock, FsImageSource, MonoFontRenderer,
    TimeRemaining,
};

fn clock() -> FixedClock {
    FixedClock::new(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap().and_hms_opt(8, 0, 0).unwrap())
}

fn plugin(config: &Value) -> CountdownPlugin {
    CountdownPlugin::new(
        "countdown",
        config,
        Box::new(MonoFontRenderer::new()),
        Box::new(FsImageSource::new()),
    )
}

fn three(c_enabled: bool) -> Value {
    json!({
        "display_duration": 5,
        "countdowns": [
            {"id": "c", "name": "C", "target_date": "2026-06-01", "display_order": 3, "enabled": c_enabled},
            {"id": "a", "name": "A", "target_date": "2026-06-01", "display_order": 1},
            {"id": "b", "name": "B", "target_date": "2026-06-01", "display_order": 2}
        ]
    })
}

fn current(p: &CountdownPlugin) -> Option<String> {
    p.info().current_id
}

#[test]
fn test_rotates_in_display_order_every_duration() {
    let mut clock = clock();
    let mut p = plugin(&three(true));

    let mut seen = Vec::new();
    for _ in 0..16 {
        let out = p.update(clock.now());
        if out.rotated || out.resnapped {
            seen.push(current(&p).unwrap());
        }
        clock.advance(TimeDelta::seconds(1));
    }
    // t=0 select, then rotate at 5, 10, 15
    assert_eq!(seen, ["a", "b", "c", "a"]);
}

#[test]
fn test_cycle_completion_reported_on_wrap() {
    let mut clock = clock();
    let mut p = plugin(&three(true));
    p.update(clock.now());

    let mut completions = 0;
    for _ in 0..3 {
        clock.advance(TimeDelta::seconds(5));
        if p.update(clock.now()).cycle_complete {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(current(&p).as_deref(), Some("a"));
}

#[test]
fn test_disabling_current_switches_immediately() {
    let mut clock = clock();
    let mut p = plugin(&three(true));
    p.update(clock.now());
    for _ in 0..2 {
        clock.advance(TimeDelta::seconds(5));
        p.update(clock.now());
    }
    assert_eq!(current(&p).as_deref(), Some("c"));

    p.on_config_changed(&three(false));
    assert_eq!(current(&p).as_deref(), Some("a"));

    // the new selection gets a full duration
    clock.advance(TimeDelta::seconds(4));
    assert!(!p.update(clock.now()).rotated);
    clock.advance(TimeDelta::seconds(1));
    assert!(p.update(clock.now()).rotated);
    assert_eq!(current(&p).as_deref(), Some("b"));
}

#[test]
fn test_day_boundaries() {
    let config = json!({
        "show_expired": true,
        "countdowns": [
            {"id": "today", "name": "T", "target_date": "2026-05-04"},
            {"id": "tomorrow", "name": "M", "target_date": "2026-05-05"},
            {"id": "fortnight", "name": "F", "target_date": "2026-05-19"},
            {"id": "yesterday", "name": "Y", "target_date": "2026-05-03"}
        ]
    });
    let mut p = plugin(&config);
    p.update(clock().now());

    let set = p.countdowns();
    assert_eq!(set.remaining_for("today"), Some(TimeRemaining::DueToday { hours: 16, minutes: 0 }));
    assert_eq!(set.remaining_for("tomorrow").unwrap().label(), "1 Day");
    assert_eq!(set.remaining_for("fortnight").unwrap().label(), "15 Days");
    assert_eq!(set.remaining_for("yesterday").unwrap().label(), "1 day ago");
    assert_eq!(p.info().eligible_count, 4);
}

#[test]
fn test_invalid_entries_do_not_block_valid_ones() {
    let config = json!({
        "countdowns": [
            "garbage",
            {"name": "No id", "target_date": "2026-06-01"},
            {"id": "ok", "name": "Fine", "target_date": "2026-06-01"},
            {"id": "ok", "name": "Dupe", "target_date": "2026-07-01"}
        ]
    });
    assert!(CountdownPlugin::validate_config(&config).is_err());

    let mut p = plugin(&config);
    p.update(clock().now());
    let info = p.info();
    assert_eq!((info.countdown_count, info.valid_count, info.eligible_count), (4, 1, 1));
    assert_eq!(info.current_id.as_deref(), Some("ok"));
}

#[test]
fn test_render_before_update_shows_placeholder() {
    let mut p = plugin(&three(true));
    let frame = p.render(32, 16);
    assert_eq!(p.info().current_index, None);

    // "No Active" spans the split, so it reaches into the left third
    let name_color = Rgb888::new(200, 200, 200);
    let left_third = Rectangle::new(Point::zero(), Size::new(32 / 3, 16));
    let top_half = Rectangle::new(Point::zero(), Size::new(32, 8));
    assert!(frame.count_in(&left_third, name_color) > 0);
    assert!(frame.count_in(&top_half, name_color) > 0);
    assert_eq!(frame.count_in(&frame.bounding_box(), Rgb888::WHITE), 0);
}
