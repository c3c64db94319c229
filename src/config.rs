use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow, bail};
use log::info;
use serde::Deserialize;

const UBIO_CONFIG_DIR: &str = env!("CARGO_PKG_NAME");
const UBIO_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
pub struct HelperConfig {
    pub program: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UbioConfig {
    pub reason: Option<String>,
    #[serde(default)]
    pub helper: HelperConfig,
}

fn default_config_file() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| anyhow!("config dir not found"))?;
    Ok(config_dir.join(UBIO_CONFIG_DIR).join(UBIO_CONFIG_FILE))
}

impl UbioConfig {
    pub fn from_file<P>(file_path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file_data = fs::read_to_string(file_path)?;

        Self::parse(&file_data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let config = toml::from_str(data)?;

        Ok(config)
    }

    /// An explicit file has to exist, the default one is optional.
    pub fn load(file_path: Option<&Path>) -> Result<Self> {
        if let Some(file_path) = file_path {
            if !file_path.exists() {
                bail!("{} doesn't exist", file_path.display());
            }

            info!("reading: {}", file_path.display());
            return Self::from_file(file_path);
        }

        let file_path = default_config_file()?;

        if !file_path.exists() {
            info!("{} not found, using defaults", file_path.display());
            return Ok(Self::default());
        }

        info!("reading: {}", file_path.display());

        Self::from_file(file_path)
    }
}
