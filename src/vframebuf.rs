/*
 *  vframebuf.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized framebuffer usable as an embedded-graphics draw target
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};

/// A runtime-sized framebuffer for embedded-graphics.
///
/// Matrix dimensions are only known when the host asks for a frame, so the
/// buffer is heap allocated and sized at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Pixel at (x, y), None outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Set a single pixel; writes outside the buffer are dropped
    pub fn set_pixel(&mut self, p: Point, color: C) {
        if let Some(i) = self.idx(p) {
            self.buf[i] = color;
        }
    }

    /// Copy `src` with its top-left corner at `origin`, clipped to the buffer
    pub fn blit(&mut self, src: &VarFrameBuf<C>, origin: Point) {
        for y in 0..src.h {
            for x in 0..src.w {
                let p = origin + Point::new(x as i32, y as i32);
                self.set_pixel(p, src.buf[y * src.w + x]);
            }
        }
    }

    /// Every pixel inside `area` (clipped) matches `color`
    pub fn region_is(&self, area: &Rectangle, color: C) -> bool {
        let area = area.intersection(&self.bounding_box());
        area.points()
            .filter_map(|p| self.idx(p))
            .all(|i| self.buf[i] == color)
    }

    /// Count of pixels inside `area` (clipped) matching `color`
    pub fn count_in(&self, area: &Rectangle, color: C) -> usize {
        let area = area.intersection(&self.bounding_box());
        area.points()
            .filter_map(|p| self.idx(p))
            .filter(|&i| self.buf[i] == color)
            .count()
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        if area.is_zero_sized() {
            return Ok(());
        }

        // partially visible areas take the per-pixel path so rows never wrap
        if area.intersection(&self.bounding_box()) != *area {
            return self.draw_iter(
                area.points().zip(colors).map(|(p, c)| Pixel(p, c)),
            );
        }

        let Size { width, height } = area.size;
        let (x0, y0) = (area.top_left.x as usize, area.top_left.y as usize);
        let w = width as usize;

        let mut it = colors.into_iter();
        for row in 0..height as usize {
            let base = (y0 + row) * self.w + x0;
            for col in 0..w {
                match it.next() {
                    Some(c) => self.buf[base + col] = c,
                    None => return Ok(()),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn test_blit_negative_origin() {
        let src = VarFrameBuf::new(4, 4, Rgb888::GREEN);
        let mut fb = VarFrameBuf::new(6, 6, Rgb888::BLACK);
        fb.blit(&src, Point::new(-2, -2));

        assert_eq!(fb.count_in(&fb.bounding_box(), Rgb888::GREEN), 4);
        assert_eq!(fb.pixel(1, 1), Some(Rgb888::GREEN));
        assert_eq!(fb.pixel(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_partially_offscreen_primitive_does_not_wrap() {
        let mut fb = VarFrameBuf::new(8, 8, Rgb888::BLACK);
        Rectangle::new(Point::new(6, 0), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::BLUE))
            .draw(&mut fb)
            .unwrap();

        // only columns 6 and 7 of rows 0 and 1
        assert_eq!(fb.count_in(&fb.bounding_box(), Rgb888::BLUE), 4);
        assert_eq!(fb.pixel(0, 1), Some(Rgb888::BLACK));
        assert!(fb.region_is(&Rectangle::new(Point::new(0, 2), Size::new(8, 6)), Rgb888::BLACK));
    }
}
