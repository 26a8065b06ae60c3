use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use image::{Rgba, RgbaImage};

use crate::err;
use crate::utils::img_stuffs::{
    index_to_xy, read_image_bottom_up, shift_hsv, unique_sibling_path, write_png_bottom_up,
};

/// Distinct opaque source color to the flat indices of every pixel carrying
/// it. Pixels with alpha 0 are never part of the map.
pub type ColorIndexMap = HashMap<Rgba<u8>, Vec<usize>>;

/// Single pass over the buffer. Index lists come out in ascending pixel
/// order.
pub fn build_color_index(img: &RgbaImage) -> ColorIndexMap {
    let mut map = ColorIndexMap::new();

    for (index, pixel) in img.pixels().enumerate() {
        if pixel[3] == 0 {
            continue;
        }

        map.entry(*pixel).or_default().push(index);
    }

    map
}

pub enum SwapMode<'a> {
    /// Uniform HSV offset applied to every distinct color.
    HueShift {
        hue: f32,
        saturation: f32,
        value: f32,
    },
    /// Explicit per-color substitution; colors missing from the mapping keep
    /// themselves.
    SingleColors(&'a HashMap<Rgba<u8>, Rgba<u8>>),
}

/// Paints every indexed pixel group with its resolved target color into a
/// fresh fully transparent buffer of the given dimensions. Pixels outside the
/// map stay transparent.
pub fn swap_colors(width: u32, height: u32, map: &ColorIndexMap, mode: &SwapMode) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);

    for (color, indices) in map {
        let target = match mode {
            SwapMode::HueShift {
                hue,
                saturation,
                value,
            } => shift_hsv(*color, *hue, *saturation, *value),
            SwapMode::SingleColors(mapping) => *mapping.get(color).unwrap_or(color),
        };

        for &index in indices {
            let (x, y) = index_to_xy(index, width);
            out.put_pixel(x, y, target);
        }
    }

    out
}

/// Owns a source image together with its color index cache and the palette
/// the caller edits. Changing swap parameters never rescans the image; only
/// replacing the source does.
pub struct ColorSwap {
    source: RgbaImage,
    index: ColorIndexMap,
    source_colors: Vec<Rgba<u8>>,
    target_colors: Vec<Rgba<u8>>,
}

impl ColorSwap {
    pub fn new(source: RgbaImage) -> Self {
        let mut index = ColorIndexMap::new();
        let mut source_colors: Vec<Rgba<u8>> = vec![];

        for (flat, pixel) in source.pixels().enumerate() {
            if pixel[3] == 0 {
                continue;
            }

            let indices = index.entry(*pixel).or_insert_with(|| {
                source_colors.push(*pixel);
                vec![]
            });
            indices.push(flat);
        }

        let target_colors = source_colors.clone();

        Self {
            source,
            index,
            source_colors,
            target_colors,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        Ok(Self::new(read_image_bottom_up(path)?))
    }

    fn log(&self, s: impl AsRef<str>) {
        println!("{}", s.as_ref());
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn index(&self) -> &ColorIndexMap {
        &self.index
    }

    /// Distinct opaque colors in first-seen order.
    pub fn source_colors(&self) -> &[Rgba<u8>] {
        &self.source_colors
    }

    pub fn target_colors(&self) -> &[Rgba<u8>] {
        &self.target_colors
    }

    /// Drops the cached index and palette along with the old image.
    pub fn set_source(&mut self, source: RgbaImage) {
        *self = Self::new(source);
    }

    pub fn set_target(&mut self, position: usize, color: Rgba<u8>) -> eyre::Result<()> {
        let Some(target) = self.target_colors.get_mut(position) else {
            return err!("No palette entry at position {}", position);
        };

        *target = color;

        Ok(())
    }

    pub fn set_target_color(&mut self, from: Rgba<u8>, to: Rgba<u8>) -> eyre::Result<()> {
        let Some(position) = self.source_colors.iter().position(|color| *color == from) else {
            return err!("Color {:?} is not in the source image", from);
        };

        self.target_colors[position] = to;

        Ok(())
    }

    /// Recomputes every target from its source color with a uniform HSV
    /// offset. Offsets are absolute against the source palette, not
    /// cumulative.
    pub fn hue_shift(&mut self, hue: f32, saturation: f32, value: f32) {
        for (position, color) in self.source_colors.iter().enumerate() {
            self.target_colors[position] = shift_hsv(*color, hue, saturation, value);
        }
    }

    pub fn swap(&self) -> RgbaImage {
        let mapping: HashMap<Rgba<u8>, Rgba<u8>> = self
            .source_colors
            .iter()
            .copied()
            .zip(self.target_colors.iter().copied())
            .collect();

        swap_colors(
            self.source.width(),
            self.source.height(),
            &self.index,
            &SwapMode::SingleColors(&mapping),
        )
    }

    /// Writes the swapped image as a PNG sibling of `source_path` without
    /// clobbering anything already there.
    pub fn save_next_to(&self, source_path: impl AsRef<Path>) -> eyre::Result<PathBuf> {
        let out_path = unique_sibling_path(source_path.as_ref().with_extension("png"));

        write_png_bottom_up(&self.swap(), &out_path)?;

        self.log(format!("Saved swapped image at {}", out_path.display()));

        Ok(out_path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn red_blue_checker() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| if (x + y * 2) % 2 == 0 { RED } else { BLUE })
    }

    #[test]
    fn index_groups_opaque_colors() {
        let map = build_color_index(&red_blue_checker());

        assert_eq!(map.len(), 2);
        assert_eq!(map[&RED], vec![0, 2]);
        assert_eq!(map[&BLUE], vec![1, 3]);
    }

    #[test]
    fn index_is_reproducible() {
        let img = red_blue_checker();

        assert_eq!(build_color_index(&img), build_color_index(&img));
    }

    #[test]
    fn single_color_swap_leaves_other_groups() {
        let img = red_blue_checker();
        let map = build_color_index(&img);

        let mut mapping = HashMap::new();
        mapping.insert(RED, GREEN);

        let out = swap_colors(2, 2, &map, &SwapMode::SingleColors(&mapping));

        assert_eq!(*out.get_pixel(0, 0), GREEN);
        assert_eq!(*out.get_pixel(0, 1), GREEN);
        assert_eq!(*out.get_pixel(1, 0), BLUE);
        assert_eq!(*out.get_pixel(1, 1), BLUE);
    }

    #[test]
    fn identity_mapping_reproduces_opaque_pixels() {
        // one transparent pixel with junk color channels
        let mut img = red_blue_checker();
        img.put_pixel(1, 1, Rgba([77, 77, 77, 0]));

        let map = build_color_index(&img);
        let out = swap_colors(2, 2, &map, &SwapMode::SingleColors(&HashMap::new()));

        assert_eq!(*out.get_pixel(0, 0), RED);
        assert_eq!(*out.get_pixel(1, 0), BLUE);
        assert_eq!(*out.get_pixel(0, 1), RED);
        assert_eq!(out.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn zero_hsv_shift_is_identity() {
        let img = red_blue_checker();
        let map = build_color_index(&img);

        let out = swap_colors(
            2,
            2,
            &map,
            &SwapMode::HueShift {
                hue: 0.,
                saturation: 0.,
                value: 0.,
            },
        );

        assert_eq!(out, img);
    }

    #[test]
    fn full_hue_wrap_is_identity() {
        let img = red_blue_checker();
        let map = build_color_index(&img);

        let out = swap_colors(
            2,
            2,
            &map,
            &SwapMode::HueShift {
                hue: 1.,
                saturation: 0.,
                value: 0.,
            },
        );

        assert_eq!(out, img);
    }

    #[test]
    fn transparent_source_is_a_no_op() {
        let img = RgbaImage::new(4, 4);
        let map = build_color_index(&img);

        assert!(map.is_empty());

        let out = swap_colors(
            4,
            4,
            &map,
            &SwapMode::HueShift {
                hue: 0.3,
                saturation: 0.1,
                value: -0.2,
            },
        );

        assert!(out.pixels().all(|pixel| pixel[3] == 0));
    }

    #[test]
    fn controller_keeps_palette_order_and_cache() {
        let mut swap = ColorSwap::new(red_blue_checker());

        assert_eq!(swap.source_colors(), &[RED, BLUE]);
        assert_eq!(swap.target_colors(), &[RED, BLUE]);

        swap.set_target_color(RED, GREEN).unwrap();
        let out = swap.swap();

        assert_eq!(*out.get_pixel(0, 0), GREEN);
        assert_eq!(*out.get_pixel(1, 0), BLUE);

        // parameter changes leave the index cache and palette order alone
        swap.hue_shift(0.25, 0., 0.);
        assert_eq!(swap.source_colors(), &[RED, BLUE]);
        assert_eq!(swap.index().len(), 2);

        assert!(swap.set_target(7, GREEN).is_err());
        assert!(swap.set_target_color(GREEN, RED).is_err());
    }

    #[test]
    fn save_next_to_does_not_clobber() {
        let dir = std::env::temp_dir().join(format!("pxtool-colorswap-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let source_path = dir.join("sprite.png");
        RgbaImage::from_pixel(2, 2, RED).save(&source_path).unwrap();

        let swap = ColorSwap::from_file(&source_path).unwrap();
        let out_path = swap.save_next_to(&source_path).unwrap();

        assert_eq!(out_path, dir.join("sprite_1.png"));

        // identity palette round-trips the pixels
        let out = image::open(&out_path).unwrap().into_rgba8();
        assert!(out.pixels().all(|pixel| *pixel == RED));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
