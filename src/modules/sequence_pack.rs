use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use eyre::eyre;
use image::{imageops, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::err;
use crate::utils::{
    constants::{MIN_CELL_SIZE, SHEET_SUFFIX},
    img_stuffs::{read_image_bottom_up, write_png_bottom_up},
};

/// The 9 standard sprite pivot anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pivot {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    RightCenter,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Pivot {
    pub fn from_name(name: &str) -> Option<Self> {
        let pivot = match name.to_lowercase().as_str() {
            "center" => Self::Center,
            "topleft" => Self::TopLeft,
            "topcenter" => Self::TopCenter,
            "topright" => Self::TopRight,
            "leftcenter" => Self::LeftCenter,
            "rightcenter" => Self::RightCenter,
            "bottomleft" => Self::BottomLeft,
            "bottomcenter" => Self::BottomCenter,
            "bottomright" => Self::BottomRight,
            _ => return None,
        };

        Some(pivot)
    }
}

/// One named cell of the packed sheet. Coordinates are bottom-left origin,
/// matching the buffer convention in [`crate::utils::img_stuffs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRect {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub pivot: Pivot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cell_width: u32,
    pub cell_height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl GridSpec {
    /// Cells are sized to the largest image (at least 2x2). `weight` trades a
    /// wide sheet against a tall one and is clamped to (0, 1) so ceiling
    /// division always yields at least one column and one row.
    pub fn from_sequence(images: &[Option<RgbaImage>], weight: f32) -> Self {
        let cell_width = images
            .iter()
            .flatten()
            .map(|img| img.width())
            .max()
            .unwrap_or(0)
            .max(MIN_CELL_SIZE);
        let cell_height = images
            .iter()
            .flatten()
            .map(|img| img.height())
            .max()
            .unwrap_or(0)
            .max(MIN_CELL_SIZE);

        let weight = weight.clamp(0.01, 0.99);
        let count = images.len() as f32;

        let columns = ((count * weight).ceil() as u32).max(1);
        let rows = ((count / columns as f32).ceil() as u32).max(1);

        Self {
            cell_width,
            cell_height,
            columns,
            rows,
        }
    }
}

/// Lays the sequence into a fresh transparent atlas, one image per cell,
/// consuming the sequence in order while filling grid rows from the top of
/// the sheet down (the highest buffer rows first). Every image is centered in
/// its cell with truncating offsets; an empty slot leaves its cell
/// transparent. Returns the atlas and one [`SpriteRect`] per cell in fill
/// order, named `"{base_name} {index}"`.
pub fn pack(
    images: &[Option<RgbaImage>],
    weight: f32,
    base_name: &str,
    pivot: Pivot,
) -> (RgbaImage, Vec<SpriteRect>) {
    let GridSpec {
        cell_width,
        cell_height,
        columns,
        rows,
    } = GridSpec::from_sequence(images, weight);

    let mut atlas = RgbaImage::new(columns * cell_width, rows * cell_height);
    let mut sprites = Vec::with_capacity((columns * rows) as usize);

    let mut index = 0usize;

    for row in (0..rows).rev() {
        for column in 0..columns {
            if let Some(Some(img)) = images.get(index) {
                let offset_x = (cell_width - img.width()) / 2;
                let offset_y = (cell_height - img.height()) / 2;

                imageops::replace(
                    &mut atlas,
                    img,
                    (column * cell_width + offset_x) as i64,
                    (row * cell_height + offset_y) as i64,
                );
            }

            sprites.push(SpriteRect {
                name: format!("{} {}", base_name, index),
                x: column * cell_width,
                y: row * cell_height,
                width: cell_width,
                height: cell_height,
                pivot,
            });

            index += 1;
        }
    }

    (atlas, sprites)
}

pub struct SequencePackOptions {
    pub weight: f32,
    pub pivot: Pivot,
    /// Defaults to the file stem of the first image.
    pub base_name: Option<String>,
    /// Appended to the base name for the output files.
    pub suffix: Option<String>,
}

impl Default for SequencePackOptions {
    fn default() -> Self {
        Self {
            weight: 0.5,
            pivot: Pivot::default(),
            base_name: None,
            suffix: None,
        }
    }
}

/// Loads an ordered list of image files, packs them and writes
/// `{base_name}{suffix}.png` plus a `.json` sidecar holding the sprite rects
/// next to the first input.
pub struct SequencePackBuilder {
    items: Vec<PathBuf>,
    options: SequencePackOptions,
}

impl SequencePackBuilder {
    pub fn new(items: Vec<PathBuf>) -> Self {
        Self {
            items,
            options: SequencePackOptions::default(),
        }
    }

    fn log(&self, s: impl AsRef<str>) {
        println!("{}", s.as_ref());
    }

    pub fn weight(&mut self, a: f32) -> &mut Self {
        self.options.weight = a;
        self
    }

    pub fn pivot(&mut self, a: Pivot) -> &mut Self {
        self.options.pivot = a;
        self
    }

    pub fn base_name(&mut self, a: impl Into<String>) -> &mut Self {
        self.options.base_name = Some(a.into());
        self
    }

    pub fn suffix(&mut self, a: impl Into<String>) -> &mut Self {
        self.options.suffix = Some(a.into());
        self
    }

    pub fn work(&self) -> eyre::Result<PathBuf> {
        if self.items.is_empty() {
            return err!("No images to pack");
        }

        let images: Vec<eyre::Result<RgbaImage>> = self
            .items
            .par_iter()
            .map(|item| {
                read_image_bottom_up(item)
                    .map_err(|err| eyre!("Cannot open image {}: {}", item.display(), err))
            })
            .collect();

        if let Some(Err(err)) = images.iter().find(|res| res.is_err()) {
            return err!("{}", err);
        }

        let images: Vec<Option<RgbaImage>> = images.into_iter().map(|res| res.ok()).collect();

        let base_name = match &self.options.base_name {
            Some(name) => name.clone(),
            None => self.items[0]
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("sheet")
                .to_string(),
        };
        let suffix = self.options.suffix.as_deref().unwrap_or(SHEET_SUFFIX);

        let (atlas, sprites) = pack(&images, self.options.weight, &base_name, self.options.pivot);

        let sheet_path = self
            .items[0]
            .with_file_name(format!("{}{}.png", base_name, suffix));

        write_png_bottom_up(&atlas, &sheet_path)?;
        self.write_sprite_rects(&sprites, &sheet_path.with_extension("json"))?;

        self.log(format!("Saved sprite sheet at {}", sheet_path.display()));

        Ok(sheet_path)
    }

    fn write_sprite_rects(&self, sprites: &[SpriteRect], path: &Path) -> eyre::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)?;

        serde_json::to_writer_pretty(file, sprites)?;

        Ok(())
    }
}
