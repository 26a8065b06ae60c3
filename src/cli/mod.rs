mod color_swap;
mod guid_ops;
mod sequence_pack;
mod tex_convert;

use crate::config::{parse_config, Config, CONFIG_FILE_NAME};

pub enum CliRes {
    Ok,
    Err,
    NoCli,
}

/// A missing config file just means defaults; a malformed one gets reported
/// before falling back so a typo is not mistaken for defaults.
fn config_or_default() -> Config {
    match parse_config() {
        Ok(config) => config,
        Err(err) => {
            println!("Cannot parse {}: {}", CONFIG_FILE_NAME, err);
            Config::default()
        }
    }
}

pub trait Cli {
    fn name(&self) -> &'static str;
    /// `args[1]` is the name of the module.
    ///
    /// Arguments for the module start at `args[2]`.
    fn cli(&self) -> CliRes;
    fn cli_help(&self);
}

pub fn cli() -> CliRes {
    let modules: &[&dyn Cli] = &[
        &sequence_pack::SequencePack,
        &color_swap::ColorSwap,
        &tex_convert::TexConvert,
        &guid_ops::GuidOps,
    ];

    let args: Vec<String> = std::env::args().collect();

    let help = || {
        println!(
            "\
pxtool

Available modules:"
        );
        for module in modules {
            println!("{}", module.name());
        }
    };

    if args.len() < 2 {
        help();
        return CliRes::NoCli;
    }

    for module in modules {
        if args[1] == module.name() {
            return module.cli();
        }
    }

    help();

    CliRes::Err
}
