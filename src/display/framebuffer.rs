/*
 *  display/framebuffer.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB frame handed to the host, plus conversions for output
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
use image::RgbImage;

use crate::vframebuf::VarFrameBuf;

/// One rendered matrix frame
pub type Frame = VarFrameBuf<Rgb888>;

impl VarFrameBuf<Rgb888> {
    /// Packed RGB888, row-major, 3 bytes per pixel
    ///
    /// This is the layout LED matrix drivers and `image` both expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.as_slice().len() * 3);
        for px in self.as_slice() {
            bytes.extend_from_slice(&[px.r(), px.g(), px.b()]);
        }
        bytes
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let (w, h) = (self.width() as u32, self.height() as u32);
        RgbImage::from_fn(w, h, |x, y| {
            let px = self.as_slice()[y as usize * self.width() + x as usize];
            image::Rgb([px.r(), px.g(), px.b()])
        })
    }
}
