/*
 *  display/renderer.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Countdown frame composition - image pane, name and time remaining
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
use log::debug;

use crate::countdown::Selection;
use crate::display::color::{
    ATTENTION_COLOR, DEFAULT_BACKGROUND, DEFAULT_NAME_COLOR, DEFAULT_VALUE_COLOR,
};
use crate::display::framebuffer::Frame;
use crate::display::image_cache::{ImageCache, PaneKey};
use crate::display::layout::{CountdownLayout, ImageFit};
use crate::display::traits::{FontSpec, ImageSource, TextRenderer};

pub const PLACEHOLDER_LINES: (&str, &str) = ("No Active", "Countdowns");

pub const DEFAULT_FONT_FAMILY: &str = "press_start";
pub const DEFAULT_FONT_SIZE: u32 = 8;

/// Resolved visual settings
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub value_font: FontSpec,
    pub value_color: Rgb888,
    pub name_font: FontSpec,
    pub name_color: Rgb888,
    pub background: Rgb888,
    pub fit: ImageFit,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            value_font: FontSpec::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE),
            value_color: DEFAULT_VALUE_COLOR,
            name_font: FontSpec::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE),
            name_color: DEFAULT_NAME_COLOR,
            background: DEFAULT_BACKGROUND,
            fit: ImageFit::Contain,
        }
    }
}

/// What to put on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scene<'a> {
    Countdown(Selection<'a>),
    NoActive,
}

impl<'a> From<Option<Selection<'a>>> for Scene<'a> {
    fn from(sel: Option<Selection<'a>>) -> Self {
        sel.map_or(Scene::NoActive, Scene::Countdown)
    }
}

/// Draws countdown frames.
///
/// Owns the text and image services plus the image pane cache; the cache is
/// the only state a render call changes.
pub struct CountdownRenderer {
    fonts: Box<dyn TextRenderer>,
    images: Box<dyn ImageSource>,
    cache: ImageCache,
}

impl CountdownRenderer {
    pub fn new(fonts: Box<dyn TextRenderer>, images: Box<dyn ImageSource>) -> Self {
        Self { fonts, images, cache: ImageCache::new() }
    }

    pub fn fonts(&self) -> &dyn TextRenderer {
        self.fonts.as_ref()
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ImageCache {
        &mut self.cache
    }

    /// Compose a `width` x `height` frame for `scene`
    pub fn render(&mut self, scene: &Scene<'_>, style: &RenderStyle, width: u32, height: u32) -> Frame {
        let mut frame = Frame::new(width, height, style.background);
        let layout = CountdownLayout::for_display(width, height);
        if layout.is_empty() {
            debug!("Zero sized frame requested ({}x{})", width, height);
            return frame;
        }

        match scene {
            Scene::Countdown(sel) => self.draw_countdown(&mut frame, &layout, style, sel),
            Scene::NoActive => self.draw_placeholder(&mut frame, &layout, style),
        }
        frame
    }

    fn draw_countdown(
        &mut self,
        frame: &mut Frame,
        layout: &CountdownLayout,
        style: &RenderStyle,
        sel: &Selection<'_>,
    ) {
        // a missing or broken image leaves the pane at background
        if let Some(reference) = sel.entry.image.as_deref() {
            let key = PaneKey {
                size: layout.image_pane.size,
                fit: style.fit,
                background: style.background,
            };
            if let Some(pane) = self.cache.get_or_load(reference, key, self.images.as_ref()) {
                frame.blit(pane, layout.image_pane.top_left);
            }
        }

        let pane_width = layout.text_pane.size.width;
        let name_font = self.fit_font(&sel.entry.name, &style.name_font, pane_width);
        self.fonts.draw_centered(
            frame,
            &sel.entry.name,
            &name_font,
            style.name_color,
            layout.name_center,
            &layout.text_pane,
        );

        let value_color = if sel.remaining.is_due_today() {
            ATTENTION_COLOR
        } else {
            style.value_color
        };
        self.fonts.draw_centered(
            frame,
            &sel.remaining.label(),
            &style.value_font,
            value_color,
            layout.value_center,
            &layout.text_pane,
        );
    }

    fn draw_placeholder(&self, frame: &mut Frame, layout: &CountdownLayout, style: &RenderStyle) {
        let (top, bottom) = layout.placeholder_centers();
        let full = layout.full();
        let (first, second) = PLACEHOLDER_LINES;
        self.fonts.draw_centered(frame, first, &style.name_font, style.name_color, top, &full);
        self.fonts.draw_centered(frame, second, &style.name_font, style.name_color, bottom, &full);
    }

    /// Step down through smaller fonts until `text` fits `max_width`
    fn fit_font(&self, text: &str, font: &FontSpec, max_width: u32) -> FontSpec {
        let mut spec = font.clone();
        while self.fonts.text_size(text, &spec).width > max_width {
            match self.fonts.smaller(&spec) {
                Some(next) => spec = next,
                None => break,
            }
        }
        if spec != *font {
            debug!("Name '{}' shrunk to font size {}", text, spec.size);
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use chrono::NaiveDate;
    use embedded_graphics::prelude::*;
    use image::DynamicImage;

    use crate::countdown::{CountdownEntry, TimeRemaining};
    use crate::display::error::ImageLoadError;
    use crate::display::fonts::MonoFontRenderer;

    struct Broken;

    impl ImageSource for Broken {
        fn resolve(&self, reference: &str) -> Result<PathBuf, ImageLoadError> {
            Ok(PathBuf::from(reference))
        }

        fn load(&self, path: &Path) -> Result<DynamicImage, ImageLoadError> {
            Err(ImageLoadError::NotFound(path.to_path_buf()))
        }
    }

    fn renderer() -> CountdownRenderer {
        CountdownRenderer::new(Box::new(MonoFontRenderer::new()), Box::new(Broken))
    }

    fn entry(name: &str, image: Option<&str>) -> CountdownEntry {
        CountdownEntry {
            id: "e1".into(),
            name: name.into(),
            target_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            image: image.map(str::to_string),
            enabled: true,
            display_order: 0,
            position: 0,
        }
    }

    #[test]
    fn test_today_is_yellow_in_text_pane() {
        let e = entry("Xmas", None);
        let scene = Scene::Countdown(Selection {
            entry: &e,
            remaining: TimeRemaining::DueToday { hours: 3, minutes: 0 },
        });
        let style = RenderStyle::default();
        let frame = renderer().render(&scene, &style, 64, 32);

        let layout = CountdownLayout::for_display(64, 32);
        assert!(frame.count_in(&layout.text_pane, ATTENTION_COLOR) > 0);
        assert!(frame.count_in(&layout.text_pane, style.name_color) > 0);
        assert_eq!(frame.count_in(&layout.text_pane, style.value_color), 0);
        assert!(frame.region_is(&layout.image_pane, style.background));
    }

    #[test]
    fn test_broken_image_leaves_background_pane() {
        let e = entry("Trip", Some("gone.png"));
        let scene = Scene::Countdown(Selection { entry: &e, remaining: TimeRemaining::Days(15) });
        let style = RenderStyle { background: Rgb888::new(0, 0, 40), ..RenderStyle::default() };
        let mut r = renderer();
        let frame = r.render(&scene, &style, 64, 32);

        let layout = CountdownLayout::for_display(64, 32);
        assert!(frame.region_is(&layout.image_pane, style.background));
        assert!(frame.count_in(&layout.text_pane, style.value_color) > 0);
        assert_eq!(r.cache().failed(), 1);
    }

    #[test]
    fn test_placeholder_spans_full_width() {
        let style = RenderStyle::default();
        let frame = renderer().render(&Scene::NoActive, &style, 64, 32);

        let layout = CountdownLayout::for_display(64, 32);
        assert!(frame.count_in(&layout.image_pane, style.name_color) > 0);
        assert!(frame.count_in(&layout.text_pane, style.name_color) > 0);
        assert_eq!(frame.count_in(&frame.bounding_box(), style.value_color), 0);
    }

    #[test]
    fn test_render_is_repeatable() {
        let e = entry("Launch", Some("gone.png"));
        let scene = Scene::Countdown(Selection { entry: &e, remaining: TimeRemaining::Days(1) });
        let style = RenderStyle::default();
        let mut r = renderer();
        assert_eq!(r.render(&scene, &style, 96, 48), r.render(&scene, &style, 96, 48));
    }

    #[test]
    fn test_zero_size_draws_nothing() {
        let frame = renderer().render(&Scene::NoActive, &RenderStyle::default(), 0, 32);
        assert!(frame.as_slice().is_empty());
    }

    #[test]
    fn test_long_name_uses_smaller_font() {
        let r = renderer();
        let font = FontSpec::new(DEFAULT_FONT_FAMILY, 10);
        // 8 chars of 6x10 = 48px, 5x8 = 40px
        assert_eq!(r.fit_font("Birthday", &font, 43).size, 8);
        assert_eq!(r.fit_font("Birthday", &font, 64), font);
        // nothing fits, stop at the smallest
        assert_eq!(r.fit_font("A very long countdown name", &font, 10).size, 6);
    }
}
