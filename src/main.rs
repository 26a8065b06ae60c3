use std::process::ExitCode;

use pxtool::cli::{cli, CliRes};

fn main() -> ExitCode {
    match cli() {
        CliRes::Ok | CliRes::NoCli => ExitCode::from(0),
        CliRes::Err => ExitCode::from(1),
    }
}
