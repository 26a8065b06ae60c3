use std::{ffi::OsStr, path::Path, path::PathBuf};

use image::{imageops, Rgba, RgbaImage};

/// Decodes an image into an RGBA buffer whose row 0 is the bottom row of the
/// picture. The pixel transforms are written against a bottom-left origin the
/// way sprite slicing metadata expects, so every file crossing flips between
/// scanline order and buffer order.
pub fn read_image_bottom_up(path: impl AsRef<Path>) -> eyre::Result<RgbaImage> {
    let img = image::open(path.as_ref())?.into_rgba8();

    Ok(imageops::flip_vertical(&img))
}

pub fn write_png_bottom_up(img: &RgbaImage, path: impl AsRef<Path>) -> eyre::Result<()> {
    let img = imageops::flip_vertical(img);

    img.save(path.as_ref())?;

    Ok(())
}

/// Hue in [0, 1), saturation and value in [0, 1] for in-gamut inputs.
pub fn rgb_to_hsv(color: Rgba<u8>) -> (f32, f32, f32) {
    let r = color[0] as f32 / 255.;
    let g = color[1] as f32 / 255.;
    let b = color[2] as f32 / 255.;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0. { 0. } else { delta / max };

    let h = if delta == 0. {
        0.
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.)
    } else if max == g {
        (b - r) / delta + 2.
    } else {
        (r - g) / delta + 4.
    };

    (h / 6., s, v)
}

/// Saturation and value may lie outside [0, 1]; each channel is clamped only
/// at the final quantization so the conversion never overflows.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32, alpha: u8) -> Rgba<u8> {
    let h = (h * 6.).rem_euclid(6.);
    let sector = h.floor() as u32 % 6;
    let f = h - h.floor();

    let p = v * (1. - s);
    let q = v * (1. - f * s);
    let t = v * (1. - (1. - f) * s);

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgba([quantize(r), quantize(g), quantize(b), alpha])
}

fn quantize(channel: f32) -> u8 {
    (channel * 255.).round().clamp(0., 255.) as u8
}

pub fn shift_hsv(color: Rgba<u8>, dh: f32, ds: f32, dv: f32) -> Rgba<u8> {
    let (h, s, v) = rgb_to_hsv(color);

    let mut h = h + dh;
    h = if h > 0. { h } else { 1. + h };
    h %= 1.;

    // saturation and value stay unclamped on purpose, the quantization above
    // catches anything out of gamut
    hsv_to_rgb(h, s + ds, v + dv, color[3])
}

// flat index into (x, y) with the buffer's row-major width
pub fn index_to_xy(index: usize, width: u32) -> (u32, u32) {
    let y = index as u32 / width;
    let x = index as u32 - y * width;

    (x, y)
}

/// Appends `_1`, `_2`, ... to the file stem until the name is free. Returns
/// the path unchanged when nothing occupies it.
pub fn unique_sibling_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let extension = path.extension().and_then(OsStr::to_str);

    for count in 1u32.. {
        let file_name = match extension {
            Some(ext) => format!("{}_{}.{}", stem, count, ext),
            None => format!("{}_{}", stem, count),
        };

        let candidate = path.with_file_name(file_name);

        if !candidate.exists() {
            return candidate;
        }
    }

    unreachable!()
}
