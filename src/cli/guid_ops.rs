use std::path::PathBuf;

use super::{Cli, CliRes};

pub struct GuidOps;

impl Cli for GuidOps {
    fn name(&self) -> &'static str {
        "guid_ops"
    }

    // In: folder to scan; lists guids and their references, optionally
    // regenerates every guid in place
    fn cli(&self) -> CliRes {
        let args: Vec<String> = std::env::args().skip(2).collect();

        if args.is_empty() {
            self.cli_help();
            return CliRes::Err;
        }

        let root = PathBuf::from(&args[0]);
        let mut regenerate = false;
        let mut search_root: Option<PathBuf> = None;

        let mut args_iter = args[1..].iter();

        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "--regenerate" => regenerate = true,
                "--search-root" => {
                    let Some(value) = args_iter.next() else {
                        println!("Missing search root.");
                        self.cli_help();
                        return CliRes::Err;
                    };

                    search_root = Some(PathBuf::from(value));
                }
                rest => {
                    println!("Unknown flag {}", rest);
                    self.cli_help();
                    return CliRes::Err;
                }
            }
        }

        let mut ops = match crate::modules::guid_ops::GuidOps::scan(root) {
            Ok(ops) => ops,
            Err(err) => {
                println!("{}", err);
                return CliRes::Err;
            }
        };

        let config = super::config_or_default();
        ops.extensions(&config.guid_extensions());

        if let Some(search_root) = search_root {
            ops.search_root(search_root);
        }

        if let Err(err) = ops.find_all_references() {
            println!("{}", err);
            return CliRes::Err;
        }

        for (guid, entry) in ops.entries() {
            let references = entry.references.as_deref().unwrap_or_default().len();

            println!(
                "{} : {} ({} references)",
                entry.asset_path.display(),
                guid,
                references
            );
        }

        if regenerate {
            if let Err(err) = ops.regenerate_all() {
                println!("{}", err);
                return CliRes::Err;
            }
        }

        CliRes::Ok
    }

    fn cli_help(&self) {
        println!(
            "\
Scans a folder's .meta sidecars, finds every text asset referencing each guid
and can rewrite them all with freshly generated guids.

<folder> [--regenerate] [--search-root <folder>]
"
        )
    }
}
