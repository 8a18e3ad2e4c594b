//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
mod source;

use std::path::{Path, PathBuf};

use tracing::debug;

use cfdi_core::CfdiConfig;

/// `<config dir>/cfdi2pdf/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cfdi2pdf")
        .join("config.json")
}

/// Config from `-c`, else the default file if it exists, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<CfdiConfig> {
    let config = match path {
        Some(path) => {
            debug!("Loading config from {}", path);
            CfdiConfig::from_file(Path::new(path))?
        }
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Loading config from {}", default_path.display());
                CfdiConfig::from_file(&default_path)?
            } else {
                CfdiConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}
