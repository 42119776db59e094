/*
 *  display/image_source.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Filesystem image source - path resolution and decode
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

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::debug;

use crate::display::error::ImageLoadError;
use crate::display::traits::ImageSource;

/// Uploads larger than this are refused before decode
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Reads entry images from disk.
///
/// Relative references are tried against the working directory first, then
/// each search root in order (typically the host's upload directory).
#[derive(Debug, Clone)]
pub struct FsImageSource {
    roots: Vec<PathBuf>,
    max_bytes: u64,
}

impl Default for FsImageSource {
    fn default() -> Self {
        Self { roots: Vec::new(), max_bytes: DEFAULT_MAX_IMAGE_BYTES }
    }
}

impl FsImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { roots: roots.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidates(&self, reference: &Path) -> Vec<PathBuf> {
        if reference.is_absolute() {
            return vec![reference.to_path_buf()];
        }
        std::iter::once(reference.to_path_buf())
            .chain(self.roots.iter().map(|r| r.join(reference)))
            .collect()
    }
}

impl ImageSource for FsImageSource {
    fn resolve(&self, reference: &str) -> Result<PathBuf, ImageLoadError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ImageLoadError::NoReference);
        }

        let wanted = Path::new(reference);
        self.candidates(wanted)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ImageLoadError::NotFound(wanted.to_path_buf()))
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, ImageLoadError> {
        let io_err = |source: std::io::Error| {
            if source.kind() == ErrorKind::NotFound {
                ImageLoadError::NotFound(path.to_path_buf())
            } else {
                ImageLoadError::Io { path: path.to_path_buf(), source }
            }
        };

        let size = fs::metadata(path).map_err(io_err)?.len();
        if size > self.max_bytes {
            return Err(ImageLoadError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(io_err)?;
        let img = image::load_from_memory(&bytes).map_err(|source| ImageLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Decoded {} ({}x{})", path.display(), img.width(), img.height());
        Ok(img)
    }
}
