/*
 *  display/image_cache.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cache of decoded, scaled and background-composited image panes
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

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::imageops::FilterType;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::display::color::over;
use crate::display::error::ImageLoadError;
use crate::display::framebuffer::Frame;
use crate::display::layout::{centered_offset, ImageFit};
use crate::display::traits::ImageSource;

/// Everything a prepared pane depends on besides the file itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneKey {
    pub size: Size,
    pub fit: ImageFit,
    pub background: Rgb888,
}

#[derive(Debug, Clone)]
struct CachedPane {
    key: PaneKey,
    /// None records a failed load so it is not retried every frame
    pane: Option<Frame>,
}

/// Image panes keyed by the entry's image reference.
///
/// A pane prepared for a different size, fit or background is rebuilt on
/// the next lookup. Nothing is evicted implicitly.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    panes: HashMap<String, CachedPane>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pane for `reference`, decoding and scaling on a miss
    pub fn get_or_load(
        &mut self,
        reference: &str,
        key: PaneKey,
        source: &dyn ImageSource,
    ) -> Option<&Frame> {
        let stale = self.panes.get(reference).is_none_or(|c| c.key != key);
        if stale {
            let pane = match load_pane(reference, key, source) {
                Ok((path, pane)) => {
                    debug!("Cached image pane for '{}' from {}", reference, path.display());
                    Some(pane)
                }
                Err(e) => {
                    warn!("Countdown image '{}' unavailable: {}", reference, e);
                    None
                }
            };
            self.panes.insert(reference.to_string(), CachedPane { key, pane });
        }
        self.panes.get(reference).and_then(|c| c.pane.as_ref())
    }

    /// Forget one reference, loaded or failed
    pub fn invalidate(&mut self, reference: &str) -> bool {
        self.panes.remove(reference).is_some()
    }

    /// Drop everything not in `live`
    pub fn retain_references(&mut self, live: &HashSet<&str>) {
        let before = self.panes.len();
        self.panes.retain(|r, _| live.contains(r.as_str()));
        if self.panes.len() != before {
            debug!("Dropped {} unused image pane(s)", before - self.panes.len());
        }
    }

    /// Forget failed loads so the next lookup tries the file again
    pub fn retain_loaded(&mut self) {
        let before = self.panes.len();
        self.panes.retain(|_, c| c.pane.is_some());
        if self.panes.len() != before {
            debug!("Retrying {} failed image load(s)", before - self.panes.len());
        }
    }

    pub fn clear(&mut self) {
        if !self.panes.is_empty() {
            info!("Clearing {} cached image pane(s)", self.panes.len());
        }
        self.panes.clear();
    }

    /// Successfully loaded panes
    pub fn len(&self) -> usize {
        self.panes.values().filter(|c| c.pane.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// References whose last load failed
    pub fn failed(&self) -> usize {
        self.panes.values().filter(|c| c.pane.is_none()).count()
    }
}

fn load_pane(
    reference: &str,
    key: PaneKey,
    source: &dyn ImageSource,
) -> Result<(PathBuf, Frame), ImageLoadError> {
    let path = source.resolve(reference)?;
    let img = source.load(&path)?;
    Ok((path, prepare_pane(&img, key)))
}

/// Scale `img` per `key.fit`, center it and composite onto the background
pub fn prepare_pane(img: &DynamicImage, key: PaneKey) -> Frame {
    let mut pane = Frame::new(key.size.width, key.size.height, key.background);
    if key.size.width == 0 || key.size.height == 0 {
        return pane;
    }

    let src = Size::new(img.width(), img.height());
    let target = key.fit.target_size(src, key.size);
    if target.width == 0 || target.height == 0 {
        return pane;
    }

    let rgba = if target == src {
        img.to_rgba8()
    } else {
        img.resize_exact(target.width, target.height, FilterType::Lanczos3).to_rgba8()
    };

    let origin = centered_offset(target, key.size);
    for (x, y, px) in rgba.enumerate_pixels() {
        pane.set_pixel(origin + Point::new(x as i32, y as i32), over(px.0, key.background));
    }
    pane
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use embedded_graphics::primitives::Rectangle;
    use image::{Rgba, RgbaImage};

    struct Memory {
        img: Option<DynamicImage>,
        loads: AtomicUsize,
    }

    impl ImageSource for Memory {
        fn resolve(&self, reference: &str) -> Result<PathBuf, ImageLoadError> {
            Ok(PathBuf::from(reference))
        }

        fn load(&self, path: &Path) -> Result<DynamicImage, ImageLoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.img.clone().ok_or_else(|| ImageLoadError::NotFound(path.to_path_buf()))
        }
    }

    fn key(bg: Rgb888) -> PaneKey {
        PaneKey { size: Size::new(10, 20), fit: ImageFit::Contain, background: bg }
    }

    #[test]
    fn test_contain_centers_and_fills_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let pane = prepare_pane(&img, key(Rgb888::BLUE));

        // 10x10 image, rows 5..15
        assert!(pane.region_is(&Rectangle::new(Point::new(0, 0), Size::new(10, 5)), Rgb888::BLUE));
        assert!(pane.region_is(&Rectangle::new(Point::new(0, 15), Size::new(10, 5)), Rgb888::BLUE));
        assert_eq!(pane.pixel(5, 10), Some(Rgb888::RED));
    }

    #[test]
    fn test_transparency_composites_over_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 20, Rgba([255, 255, 255, 0])));
        let pane = prepare_pane(&img, key(Rgb888::new(9, 8, 7)));
        assert!(pane.region_is(&pane.bounding_box(), Rgb888::new(9, 8, 7)));
    }

    #[test]
    fn test_native_larger_than_pane_is_clipped() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 30, Rgba([0, 255, 0, 255])));
        let k = PaneKey { fit: ImageFit::Native, ..key(Rgb888::BLACK) };
        let pane = prepare_pane(&img, k);
        assert_eq!(pane.width(), 10);
        assert!(pane.region_is(&pane.bounding_box(), Rgb888::GREEN));
    }

    #[test]
    fn test_hits_failures_and_key_changes() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255])));
        let src = Memory { img: Some(img), loads: AtomicUsize::new(0) };
        let mut cache = ImageCache::new();

        assert!(cache.get_or_load("a.png", key(Rgb888::BLACK), &src).is_some());
        assert!(cache.get_or_load("a.png", key(Rgb888::BLACK), &src).is_some());
        assert_eq!(src.loads.load(Ordering::SeqCst), 1);

        cache.get_or_load("a.png", key(Rgb888::WHITE), &src);
        assert_eq!(src.loads.load(Ordering::SeqCst), 2);

        let broken = Memory { img: None, loads: AtomicUsize::new(0) };
        let mut misses = 0;
        for _ in 0..3 {
            if cache.get_or_load("b.png", key(Rgb888::BLACK), &broken).is_none() {
                misses += 1;
            }
        }
        assert_eq!(misses, 3);
        assert_eq!(broken.loads.load(Ordering::SeqCst), 1);
        assert_eq!((cache.len(), cache.failed()), (1, 1));

        assert!(cache.invalidate("b.png"));
        assert!(!cache.invalidate("b.png"));
        cache.retain_references(&HashSet::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_retain_loaded_retries_failures() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255])));
        let good = Memory { img: Some(img), loads: AtomicUsize::new(0) };
        let broken = Memory { img: None, loads: AtomicUsize::new(0) };
        let mut cache = ImageCache::new();

        cache.get_or_load("a.png", key(Rgb888::BLACK), &good);
        cache.get_or_load("b.png", key(Rgb888::BLACK), &broken);
        assert_eq!((cache.len(), cache.failed()), (1, 1));

        cache.retain_loaded();
        assert_eq!((cache.len(), cache.failed()), (1, 0));

        // the file showed up in the meantime
        assert!(cache.get_or_load("b.png", key(Rgb888::BLACK), &good).is_some());
        assert!(cache.get_or_load("a.png", key(Rgb888::BLACK), &good).is_some());
        assert_eq!(good.loads.load(Ordering::SeqCst), 2);
    }
}
