//! pxtool is a small collection of 2D asset tools: an image sequence packer
//! that lays animation frames into a sprite sheet, a palette/HSV color swapper
//! for pixel art, a texture format converter, and GUID replacement over
//! text-based asset files.
//!
//! The pixel transforms are plain functions over [`image::RgbaImage`] buffers.
//! File loading, saving, and path picking live in the per-module drivers and
//! the CLI so the transforms stay easy to test.

pub mod cli;
pub mod config;
pub mod modules;
pub mod utils;

#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Err(eyre::eyre!($($arg)*))
    };
}
