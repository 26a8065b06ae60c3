use std::path::PathBuf;

use crate::modules::tex_convert::{convert_folder, convert_image, FileFormat, Filter, TexConvertOptions};

use super::{Cli, CliRes};

pub struct TexConvert;

impl Cli for TexConvert {
    fn name(&self) -> &'static str {
        "tex_convert"
    }

    // In: an image file or a folder, then the target format and flags
    fn cli(&self) -> CliRes {
        let args: Vec<String> = std::env::args().skip(2).collect();

        if args.len() < 2 {
            self.cli_help();
            return CliRes::Err;
        }

        let path = PathBuf::from(&args[0]);

        let Some(format) = FileFormat::from_name(&args[1]) else {
            println!("Unknown format {}", args[1]);
            self.cli_help();
            return CliRes::Err;
        };

        let config = super::config_or_default();

        let mut options = TexConvertOptions {
            format,
            jpg_quality: config.jpg_quality(),
            ..Default::default()
        };

        let mut args_iter = args[2..].iter();

        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "--size" => {
                    let parsed = args_iter.next().and_then(|value| {
                        let (width, height) = value.split_once('x')?;
                        Some((width.parse::<u32>().ok()?, height.parse::<u32>().ok()?))
                    });

                    let Some(dimensions) = parsed else {
                        println!("Cannot parse size.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    options.dimensions = Some(dimensions);
                }
                "--filter" => {
                    let Some(filter) = args_iter.next().and_then(|v| Filter::from_name(v)) else {
                        println!("Cannot parse filter.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    options.filter = filter;
                }
                "--quality" => {
                    let Some(quality) = args_iter
                        .next()
                        .and_then(|v| v.parse::<u8>().ok())
                        .filter(|q| (1..=100).contains(q))
                    else {
                        println!("Cannot parse quality.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    options.jpg_quality = quality;
                }
                "--replace" => options.replace = true,
                rest => {
                    println!("Unknown flag {}", rest);
                    self.cli_help();
                    return CliRes::Err;
                }
            }
        }

        let res = if path.is_dir() {
            convert_folder(&path, &options).map(|out| {
                for path in out {
                    println!("Converted {}", path.display());
                }
            })
        } else {
            convert_image(&path, &options).map(|out| {
                println!("Converted {}", out.display());
            })
        };

        match res {
            Ok(_) => CliRes::Ok,
            Err(err) => {
                println!("{}", err);
                CliRes::Err
            }
        }
    }

    fn cli_help(&self) {
        println!(
            "\
Converts an image (or every image directly inside a folder) to another raster
format, optionally resizing on the way.

<file or folder> <png|jpg|tga|exr> [--size WxH] [--filter point|bilinear] [--quality 1-100] [--replace]
"
        )
    }
}
