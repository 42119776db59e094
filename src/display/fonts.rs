/*
 *  display/fonts.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text service backed by the embedded-graphics mono fonts
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

use std::ops::RangeInclusive;

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X9, FONT_6X10, FONT_6X12, FONT_6X13,
    FONT_7X14, FONT_9X15, FONT_9X18,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::debug;

use crate::display::framebuffer::Frame;
use crate::display::traits::{FontSpec, TextRenderer};

/// Built-in fonts, one per glyph height, ascending
const FONT_TABLE: &[&MonoFont<'static>] = &[
    &FONT_4X6,
    &FONT_5X7,
    &FONT_5X8,
    &FONT_6X9,
    &FONT_6X10,
    &FONT_6X12,
    &FONT_6X13,
    &FONT_7X14,
    &FONT_9X15,
    &FONT_9X18,
    &FONT_10X20,
];

/// Family the built-in faces answer to
pub const BUILTIN_FAMILY: &str = "mono";

/// Renders with the embedded-graphics ASCII mono fonts.
///
/// Every family maps to the same face table; a configured size selects the
/// tallest face whose glyph height does not exceed it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoFontRenderer;

impl MonoFontRenderer {
    pub fn new() -> Self {
        Self
    }

    fn index_for(size: u32) -> usize {
        FONT_TABLE
            .iter()
            .rposition(|f| f.character_size.height <= size)
            .unwrap_or(0)
    }

    fn font_for(spec: &FontSpec) -> &'static MonoFont<'static> {
        FONT_TABLE[Self::index_for(spec.size)]
    }
}

impl TextRenderer for MonoFontRenderer {
    fn size_range(&self) -> RangeInclusive<u32> {
        let min = FONT_TABLE[0].character_size.height;
        let max = FONT_TABLE[FONT_TABLE.len() - 1].character_size.height;
        min..=max
    }

    fn text_size(&self, text: &str, font: &FontSpec) -> Size {
        let face = Self::font_for(font);
        let n = text.chars().count() as u32;
        if n == 0 {
            return Size::new(0, face.character_size.height);
        }
        let width = n * face.character_size.width + (n - 1) * face.character_spacing;
        Size::new(width, face.character_size.height)
    }

    fn smaller(&self, font: &FontSpec) -> Option<FontSpec> {
        let current = Self::font_for(font).character_size.height;
        FONT_TABLE
            .iter()
            .rev()
            .map(|f| f.character_size.height)
            .find(|&h| h < current)
            .map(|h| FontSpec::new(font.family.clone(), h))
    }

    fn draw_centered(
        &self,
        target: &mut Frame,
        text: &str,
        font: &FontSpec,
        color: Rgb888,
        center: Point,
        clip: &Rectangle,
    ) {
        if text.is_empty() || clip.is_zero_sized() {
            return;
        }
        let face = Self::font_for(font);
        debug!(
            "Drawing '{}' in {} {}x{} at {:?}",
            text, font.family, face.character_size.width, face.character_size.height, center
        );

        let char_style = MonoTextStyle::new(face, color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();

        let mut clipped = target.clipped(clip);
        Text::with_text_style(text, center, char_style, text_style)
            .draw(&mut clipped)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_selects_tallest_face_not_exceeding() {
        let r = MonoFontRenderer::new();
        assert_eq!(r.text_size("ABC", &FontSpec::new("press_start", 8)), Size::new(15, 8));
        assert_eq!(r.text_size("A", &FontSpec::new("press_start", 11)), Size::new(6, 10));
        // below the smallest face the smallest is used
        assert_eq!(r.text_size("AB", &FontSpec::new("x", 2)), Size::new(8, 6));
        assert_eq!(r.size_range(), 6..=20);
    }

    #[test]
    fn test_smaller_walks_down_to_minimum() {
        let r = MonoFontRenderer::new();
        let mut spec = FontSpec::new(BUILTIN_FAMILY, 20);
        let mut heights = vec![20];
        while let Some(next) = r.smaller(&spec) {
            heights.push(next.size);
            spec = next;
        }
        assert_eq!(heights, [20, 18, 15, 14, 13, 12, 10, 9, 8, 7, 6]);
    }

    #[test]
    fn test_draw_is_clipped() {
        let r = MonoFontRenderer::new();
        let mut frame = Frame::new(40, 10, Rgb888::BLACK);
        let clip = Rectangle::new(Point::new(20, 0), Size::new(20, 10));
        r.draw_centered(
            &mut frame,
            "WWWWWWWWWW",
            &FontSpec::new(BUILTIN_FAMILY, 8),
            Rgb888::WHITE,
            Point::new(20, 5),
            &clip,
        );

        let left = Rectangle::new(Point::zero(), Size::new(20, 10));
        assert!(frame.region_is(&left, Rgb888::BLACK));
        assert!(frame.count_in(&clip, Rgb888::WHITE) > 0);
    }
}
