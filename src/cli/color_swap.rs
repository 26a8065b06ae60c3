use std::path::PathBuf;

use image::Rgba;

use super::{Cli, CliRes};

pub struct ColorSwap;

impl Cli for ColorSwap {
    fn name(&self) -> &'static str {
        "color_swap"
    }

    // In: source image, then a mode: `hsv <h> <s> <v>` or `swap <from=to...>`
    fn cli(&self) -> CliRes {
        let args: Vec<String> = std::env::args().skip(2).collect();

        if args.len() < 2 {
            self.cli_help();
            return CliRes::Err;
        }

        let source_path = PathBuf::from(&args[0]);

        let mut swap = match crate::modules::color_swap::ColorSwap::from_file(&source_path) {
            Ok(swap) => swap,
            Err(err) => {
                println!("Cannot open image {}: {}", source_path.display(), err);
                return CliRes::Err;
            }
        };

        match args[1].as_str() {
            "hsv" => {
                if args.len() != 5 {
                    self.cli_help();
                    return CliRes::Err;
                }

                let (Ok(hue), Ok(saturation), Ok(value)) = (
                    args[2].parse::<f32>(),
                    args[3].parse::<f32>(),
                    args[4].parse::<f32>(),
                ) else {
                    println!("Cannot parse HSV deltas.");
                    self.cli_help();
                    return CliRes::Err;
                };

                swap.hue_shift(hue, saturation, value);
            }
            "swap" => {
                for pair in &args[2..] {
                    let parsed = pair
                        .split_once('=')
                        .and_then(|(from, to)| Some((parse_hex_color(from)?, parse_hex_color(to)?)));

                    let Some((from, to)) = parsed else {
                        println!("Cannot parse color pair {}", pair);
                        self.cli_help();
                        return CliRes::Err;
                    };

                    if let Err(err) = swap.set_target_color(from, to) {
                        println!("{}", err);
                        return CliRes::Err;
                    }
                }
            }
            _ => {
                self.cli_help();
                return CliRes::Err;
            }
        }

        match swap.save_next_to(&source_path) {
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
Rewrites the distinct colors of a pixel art image and saves the result as a
new sibling file.

<image> hsv <hue> <saturation> <value>
<image> swap <rrggbb[aa]=rrggbb[aa]...>
"
        )
    }
}

fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim_start_matches('#');

    if s.len() != 6 && s.len() != 8 {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    Some(Rgba([
        channel(0)?,
        channel(2)?,
        channel(4)?,
        if s.len() == 8 { channel(6)? } else { 255 },
    ]))
}
