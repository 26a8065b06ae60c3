//! Parses config file

use std::{
    env,
    fs::OpenOptions,
    io::Read,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::utils::constants::{DEFAULT_JPG_QUALITY, GUID_REFERENCE_EXTENSIONS, SHEET_SUFFIX};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub jpg_quality: Option<u8>,
    pub sheet_suffix: Option<String>,
    pub guid_extensions: Option<Vec<String>>,
}

impl Config {
    pub fn jpg_quality(&self) -> u8 {
        self.jpg_quality.unwrap_or(DEFAULT_JPG_QUALITY)
    }

    pub fn sheet_suffix(&self) -> String {
        self.sheet_suffix
            .clone()
            .unwrap_or_else(|| SHEET_SUFFIX.to_string())
    }

    pub fn guid_extensions(&self) -> Vec<String> {
        self.guid_extensions.clone().unwrap_or_else(|| {
            GUID_REFERENCE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        })
    }
}

pub static CONFIG_FILE_NAME: &str = "config.toml";

/// Parse `config.toml` in the same folder as the binary. A missing file just
/// means defaults.
pub fn parse_config() -> eyre::Result<Config> {
    let path = match env::current_exe() {
        Ok(path) => path.parent().unwrap_or(Path::new(".")).join(CONFIG_FILE_NAME),
        Err(_) => PathBuf::from(CONFIG_FILE_NAME),
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    parse_config_from_file(path.as_path())
}

pub fn parse_config_from_file(path: &Path) -> eyre::Result<Config> {
    let mut file = OpenOptions::new().read(true).open(path.as_os_str())?;
    let mut buffer = String::new();

    file.read_to_string(&mut buffer)?;

    let config: Config = toml::from_str(&buffer)?;

    Ok(config)
}
