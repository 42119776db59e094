/*
 *  display/traits.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capability traits the renderer depends on - text and image services
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
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::DynamicImage;

use crate::display::error::ImageLoadError;
use crate::display::framebuffer::Frame;

/// Font request as configured - a family name and a pixel size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self { family: family.into(), size }
    }
}

/// Text measurement and drawing service
///
/// The host owns font selection and rasterization; the plugin receives an
/// implementation at construction instead of reaching for a global manager.
pub trait TextRenderer: Send {
    /// Sizes this service can honor, configured sizes are clamped into it
    fn size_range(&self) -> RangeInclusive<u32>;

    /// Bounding size of `text` drawn with `font`
    fn text_size(&self, text: &str, font: &FontSpec) -> Size;

    /// Next smaller font of the same family, None at the smallest
    fn smaller(&self, font: &FontSpec) -> Option<FontSpec>;

    /// Draw `text` centered on `center`, never touching pixels outside `clip`
    fn draw_centered(
        &self,
        target: &mut Frame,
        text: &str,
        font: &FontSpec,
        color: Rgb888,
        center: Point,
        clip: &Rectangle,
    );
}

/// Image lookup and decode service
pub trait ImageSource: Send {
    /// Map an entry's image reference to a file path
    fn resolve(&self, reference: &str) -> Result<PathBuf, ImageLoadError>;

    /// Decode the image at a resolved path
    fn load(&self, path: &Path) -> Result<DynamicImage, ImageLoadError>;
}
