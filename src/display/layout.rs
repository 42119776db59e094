/*
 *  display/layout.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Countdown screen geometry - image pane, text pane and image fitting
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Screen geometry for one display size
///
/// The left third holds the entry image, the remaining two thirds hold the
/// name and countdown lines at one and two thirds of the height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownLayout {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Image area, [0, W/3) x [0, H)
    pub image_pane: Rectangle,

    /// Text area, [W/3, W) x [0, H)
    pub text_pane: Rectangle,

    /// Center of the name line
    pub name_center: Point,

    /// Center of the time remaining line
    pub value_center: Point,
}

impl CountdownLayout {
    pub fn for_display(width: u32, height: u32) -> Self {
        let split = width / 3;
        let text_width = width - split;
        let first_line = (height / 3) as i32;
        let second_line = (height * 2 / 3) as i32;
        let text_x = (split + text_width / 2) as i32;

        Self {
            width,
            height,
            image_pane: Rectangle::new(Point::zero(), Size::new(split, height)),
            text_pane: Rectangle::new(Point::new(split as i32, 0), Size::new(text_width, height)),
            name_center: Point::new(text_x, first_line),
            value_center: Point::new(text_x, second_line),
        }
    }

    /// Whole screen, used by the placeholder which ignores the split
    pub fn full(&self) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(self.width, self.height))
    }

    /// Centers of the two placeholder lines
    pub fn placeholder_centers(&self) -> (Point, Point) {
        let x = (self.width / 2) as i32;
        (Point::new(x, self.name_center.y), Point::new(x, self.value_center.y))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How an image is fitted into its pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFit {
    /// Uniform scale to the largest size that fits, centered
    Contain,

    /// Scale each axis to fill the pane
    Stretch,

    /// Native resolution, centered and clipped
    Native,
}

impl ImageFit {
    pub fn from_flags(fit_to_display: bool, preserve_aspect_ratio: bool) -> Self {
        match (fit_to_display, preserve_aspect_ratio) {
            (true, true) => ImageFit::Contain,
            (true, false) => ImageFit::Stretch,
            (false, _) => ImageFit::Native,
        }
    }

    /// Target size for an image of `src` pixels in a pane of `pane` pixels
    pub fn target_size(&self, src: Size, pane: Size) -> Size {
        match self {
            ImageFit::Native => src,
            ImageFit::Stretch => pane,
            ImageFit::Contain => {
                if src.width == 0 || src.height == 0 {
                    return Size::zero();
                }
                let sx = pane.width as f64 / src.width as f64;
                let sy = pane.height as f64 / src.height as f64;
                let scale = sx.min(sy);
                // truncate, but never collapse a visible image to nothing
                let w = ((src.width as f64 * scale) as u32).max(1).min(pane.width);
                let h = ((src.height as f64 * scale) as u32).max(1).min(pane.height);
                Size::new(w, h)
            }
        }
    }
}

/// Top-left offset that centers `inner` in `outer`; negative when larger
pub fn centered_offset(inner: Size, outer: Size) -> Point {
    let dx = (outer.width as i64 - inner.width as i64).div_euclid(2);
    let dy = (outer.height as i64 - inner.height as i64).div_euclid(2);
    Point::new(dx as i32, dy as i32)
}
