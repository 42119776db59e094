/*
 *  display/color.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB colors for the matrix and lenient parsing of configured colors
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::warn;
use serde_json::Value;

/// Value text color on the target day, independent of configuration
pub const ATTENTION_COLOR: Rgb888 = Rgb888::new(255, 255, 0);

pub const DEFAULT_VALUE_COLOR: Rgb888 = Rgb888::new(255, 255, 255);
pub const DEFAULT_NAME_COLOR: Rgb888 = Rgb888::new(200, 200, 200);
pub const DEFAULT_BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);

/// Parse a configured color.
///
/// Accepts `[r, g, b]` with integer, float or numeric-string components, or
/// a `#rrggbb` string. Components are clamped to 0..=255. Anything else
/// falls back to `default` with a warning; a missing value is silent.
pub fn parse_color(value: Option<&Value>, default: Rgb888, what: &str) -> Rgb888 {
    let Some(value) = value else {
        return default;
    };

    let parsed = match value {
        Value::Null => return default,
        Value::Array(items) if items.len() == 3 => {
            let comps: Option<Vec<u8>> = items.iter().map(component).collect();
            comps.map(|c| Rgb888::new(c[0], c[1], c[2]))
        }
        Value::String(s) => parse_hex(s),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        warn!("Invalid {} color {}, using default", what, value);
        default
    })
}

fn component(v: &Value) -> Option<u8> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    if !(0.0..=255.0).contains(&n) {
        warn!("Color component {} out of range, clamping to 0-255", n);
    }
    Some(n.clamp(0.0, 255.0) as u8)
}

fn parse_hex(s: &str) -> Option<Rgb888> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb888::new(byte(0)?, byte(2)?, byte(4)?))
}

/// Alpha-blend one channel over a background channel
#[inline]
pub fn blend_channel(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((fg as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8
}

/// Composite an RGBA pixel over an opaque background
pub fn over(rgba: [u8; 4], bg: Rgb888) -> Rgb888 {
    let [r, g, b, a] = rgba;
    Rgb888::new(
        blend_channel(r, bg.r(), a),
        blend_channel(g, bg.g(), a),
        blend_channel(b, bg.b(), a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_forms() {
        let white = Rgb888::WHITE;
        assert_eq!(parse_color(Some(&json!([10, 20, 30])), white, "t"), Rgb888::new(10, 20, 30));
        assert_eq!(parse_color(Some(&json!([10.7, "20", " 30 "])), white, "t"), Rgb888::new(10, 20, 30));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let c = parse_color(Some(&json!([300, -5, 128])), Rgb888::WHITE, "t");
        assert_eq!(c, Rgb888::new(255, 0, 128));
    }

    #[test]
    fn test_hex_and_fallbacks() {
        let d = Rgb888::new(1, 2, 3);
        assert_eq!(parse_color(Some(&json!("#FF8000")), d, "t"), Rgb888::new(255, 128, 0));
        assert_eq!(parse_color(Some(&json!("ff8000")), d, "t"), Rgb888::new(255, 128, 0));
        assert_eq!(parse_color(Some(&json!("orange")), d, "t"), d);
        assert_eq!(parse_color(Some(&json!([1, 2])), d, "t"), d);
        assert_eq!(parse_color(Some(&json!([1, "x", 3])), d, "t"), d);
        assert_eq!(parse_color(Some(&json!({"r": 1})), d, "t"), d);
        assert_eq!(parse_color(None, d, "t"), d);
    }

    #[test]
    fn test_over_extremes() {
        let bg = Rgb888::new(10, 20, 30);
        assert_eq!(over([200, 100, 50, 255], bg), Rgb888::new(200, 100, 50));
        assert_eq!(over([200, 100, 50, 0], bg), bg);
        assert_eq!(over([255, 255, 255, 128], Rgb888::BLACK), Rgb888::new(128, 128, 128));
    }
}
