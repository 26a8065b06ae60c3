use std::{
    fs,
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use eyre::eyre;
use image::{
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
    DynamicImage,
};
use rayon::prelude::*;

use crate::err;
use crate::utils::{
    constants::{CONVERTIBLE_EXTENSIONS, DEFAULT_JPG_QUALITY},
    img_stuffs::unique_sibling_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    #[default]
    Png,
    Jpg,
    Tga,
    Exr,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Tga => "tga",
            Self::Exr => "exr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpg,
            "tga" => Self::Tga,
            "exr" => Self::Exr,
            _ => return None,
        };

        Some(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest neighbor, keeps pixel art crisp.
    Point,
    #[default]
    Bilinear,
}

impl Filter {
    fn filter_type(&self) -> FilterType {
        match self {
            Self::Point => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let filter = match name.to_lowercase().as_str() {
            "point" => Self::Point,
            "bilinear" => Self::Bilinear,
            _ => return None,
        };

        Some(filter)
    }
}

pub struct TexConvertOptions {
    pub format: FileFormat,
    /// \[1, 100\]
    pub jpg_quality: u8,
    /// Resize to this size when it differs from the source.
    pub dimensions: Option<(u32, u32)>,
    pub filter: Filter,
    /// Remove the source file instead of writing to a unique sibling path.
    pub replace: bool,
}

impl Default for TexConvertOptions {
    fn default() -> Self {
        Self {
            format: FileFormat::default(),
            jpg_quality: DEFAULT_JPG_QUALITY,
            dimensions: None,
            filter: Filter::default(),
            replace: false,
        }
    }
}

/// Decodes one image, optionally resizes it, and re-encodes it in the chosen
/// format. Returns the path of the written file.
pub fn convert_image(path: &Path, options: &TexConvertOptions) -> eyre::Result<PathBuf> {
    let img = image::open(path)
        .map_err(|err| eyre!("Cannot open image {}: {}", path.display(), err))?
        .into_rgba8();

    let img = match options.dimensions {
        Some((width, height)) if (width, height) != img.dimensions() => {
            imageops::resize(&img, width, height, options.filter.filter_type())
        }
        _ => img,
    };

    let out_path = path.with_extension(options.format.extension());
    let out_path = if options.replace {
        out_path
    } else {
        unique_sibling_path(&out_path)
    };

    match options.format {
        FileFormat::Png | FileFormat::Tga => img.save(&out_path)?,
        FileFormat::Jpg => {
            let mut out_file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&out_path)?;

            let mut encoder = JpegEncoder::new_with_quality(&mut out_file, options.jpg_quality);

            // jpg has no alpha channel
            encoder.encode_image(&DynamicImage::ImageRgba8(img).to_rgb8())?;
        }
        FileFormat::Exr => {
            let img = DynamicImage::ImageRgba8(img).to_rgba32f();

            DynamicImage::ImageRgba32F(img).save(&out_path)?;
        }
    }

    if options.replace && out_path != path {
        fs::remove_file(path)?;
    }

    Ok(out_path)
}

/// Converts every raster file directly inside the folder, collecting per-file
/// errors into one report.
pub fn convert_folder(path: &Path, options: &TexConvertOptions) -> eyre::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return err!("{} is not a folder", path.display());
    }

    let mut work_items: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|item| {
            item.is_file()
                && item
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    work_items.sort();

    let results: Vec<eyre::Result<PathBuf>> = work_items
        .par_iter()
        .map(|item| convert_image(item, options))
        .collect();

    if results.iter().any(|res| res.is_err()) {
        let err_str = results
            .iter()
            .filter_map(|res| res.as_ref().err())
            .fold(String::new(), |acc, e| format!("{}\n{}", acc, e));

        return err!(err_str);
    }

    Ok(results.into_iter().map(|res| res.unwrap()).collect())
}

#[cfg(test)]
mod test {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pxtool-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn converts_and_resizes_to_jpg() {
        let dir = test_dir("texconvert-jpg");
        let source = dir.join("tex.png");
        RgbaImage::from_pixel(4, 4, RED).save(&source).unwrap();

        let options = TexConvertOptions {
            format: FileFormat::Jpg,
            dimensions: Some((2, 2)),
            filter: Filter::Point,
            ..Default::default()
        };

        let out = convert_image(&source, &options).unwrap();

        assert_eq!(out, dir.join("tex.jpg"));
        assert!(source.exists());
        assert_eq!(image::open(&out).unwrap().into_rgba8().dimensions(), (2, 2));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn same_format_without_replace_picks_a_unique_name() {
        let dir = test_dir("texconvert-unique");
        let source = dir.join("tex.png");
        RgbaImage::from_pixel(2, 2, RED).save(&source).unwrap();

        let out = convert_image(&source, &TexConvertOptions::default()).unwrap();

        assert_eq!(out, dir.join("tex_1.png"));
        assert!(source.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replace_removes_the_source() {
        let dir = test_dir("texconvert-replace");
        let source = dir.join("tex.png");
        RgbaImage::from_pixel(2, 2, RED).save(&source).unwrap();

        let options = TexConvertOptions {
            format: FileFormat::Tga,
            replace: true,
            ..Default::default()
        };

        let out = convert_image(&source, &options).unwrap();

        assert_eq!(out, dir.join("tex.tga"));
        assert!(!source.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn folder_conversion_takes_every_raster_file() {
        let dir = test_dir("texconvert-folder");
        RgbaImage::from_pixel(2, 2, RED)
            .save(dir.join("a.png"))
            .unwrap();
        RgbaImage::from_pixel(2, 2, RED)
            .save(dir.join("b.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let options = TexConvertOptions {
            format: FileFormat::Tga,
            ..Default::default()
        };

        let out = convert_folder(&dir, &options).unwrap();

        assert_eq!(out.len(), 2);
        assert!(dir.join("a.tga").exists());
        assert!(dir.join("b.tga").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
