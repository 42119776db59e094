/*
 *  display/mod.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - frames, text and image services, countdown rendering
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod color;

// Services
pub mod fonts;
pub mod image_source;
pub mod image_cache;

// Screen geometry and composition
pub mod layout;
pub mod renderer;

// Re-exports for convenience
pub use traits::{FontSpec, ImageSource, TextRenderer};
pub use error::ImageLoadError;
pub use framebuffer::Frame;
pub use color::{parse_color, ATTENTION_COLOR};
pub use fonts::MonoFontRenderer;
pub use image_source::{FsImageSource, DEFAULT_MAX_IMAGE_BYTES};
pub use image_cache::{ImageCache, PaneKey};
pub use layout::{CountdownLayout, ImageFit};
pub use renderer::{CountdownRenderer, RenderStyle, Scene};
