/*
 *  display/error.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the image side of the display subsystem
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

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Reasons an entry image could not be turned into a bitmap.
///
/// None of these reach the host; the renderer logs them and falls back to a
/// background-colored image pane.
#[derive(Debug)]
pub enum ImageLoadError {
    /// Reference was empty
    NoReference,

    /// File does not exist
    NotFound(PathBuf),

    /// File exceeds the configured size limit
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// File exists but could not be read
    Io { path: PathBuf, source: std::io::Error },

    /// Unsupported or corrupt image data
    Decode { path: PathBuf, source: image::ImageError },
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLoadError::NoReference =>
                write!(f, "No image reference"),
            ImageLoadError::NotFound(path) =>
                write!(f, "Image file not found: {}", path.display()),
            ImageLoadError::TooLarge { path, size, limit } =>
                write!(f, "Image file {} is {} bytes (limit {})", path.display(), size, limit),
            ImageLoadError::Io { path, source } =>
                write!(f, "Cannot read image {}: {}", path.display(), source),
            ImageLoadError::Decode { path, source } =>
                write!(f, "Cannot decode image {}: {}", path.display(), source),
        }
    }
}

impl Error for ImageLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImageLoadError::Io { source, .. } => Some(source),
            ImageLoadError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}
