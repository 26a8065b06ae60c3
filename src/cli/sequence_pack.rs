use std::path::{Path, PathBuf};

use crate::modules::sequence_pack::{Pivot, SequencePackBuilder};
use crate::utils::constants::CONVERTIBLE_EXTENSIONS;

use super::{Cli, CliRes};

pub struct SequencePack;

impl Cli for SequencePack {
    fn name(&self) -> &'static str {
        "sequence_pack"
    }

    // In: a folder of frames or an ordered list of image files
    fn cli(&self) -> CliRes {
        let args: Vec<String> = std::env::args().skip(2).collect();

        if args.is_empty() {
            self.cli_help();
            return CliRes::Err;
        }

        let mut items: Vec<PathBuf> = vec![];
        let mut weight = 0.5f32;
        let mut pivot = Pivot::default();

        let mut args_iter = args.iter();

        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "--weight" => {
                    let Some(value) = args_iter.next().and_then(|v| v.parse::<f32>().ok()) else {
                        println!("Cannot parse weight.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    weight = value;
                }
                "--pivot" => {
                    let Some(value) = args_iter.next().and_then(|v| Pivot::from_name(v)) else {
                        println!("Cannot parse pivot.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    pivot = value;
                }
                _ => items.push(PathBuf::from(arg)),
            }
        }

        // a single folder means every image inside, in name order
        if items.len() == 1 && items[0].is_dir() {
            match frames_in_folder(&items[0]) {
                Ok(found) => items = found,
                Err(_) => {
                    println!("Cannot read folder {}", items[0].display());
                    return CliRes::Err;
                }
            }
        }

        let config = super::config_or_default();

        let mut builder = SequencePackBuilder::new(items);
        builder
            .weight(weight)
            .pivot(pivot)
            .suffix(config.sheet_suffix());

        match builder.work() {
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
Packs an ordered image sequence into one sprite sheet and writes a .json
sidecar with the sprite slicing rects.

<folder or image files...> [--weight 0..1] [--pivot center|topleft|topcenter|topright|leftcenter|rightcenter|bottomleft|bottomcenter|bottomright]
"
        )
    }
}

/// Every raster file directly inside the folder, in name order.
fn frames_in_folder(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    found.sort();

    Ok(found)
}
