//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod review;

use std::path::{Path, PathBuf};

use haul_core::models::config::HaulConfig;
use haul_core::JsonFileStore;

/// Load configuration from `--config`, the user config file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HaulConfig> {
    if let Some(path) = config_path {
        return Ok(HaulConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(HaulConfig::from_file(&default_path)?)
    } else {
        Ok(HaulConfig::default())
    }
}

/// Open the ticket store named on the command line or in the config.
pub fn open_store(store: Option<&PathBuf>, config: &HaulConfig) -> JsonFileStore {
    let path = store.cloned().unwrap_or_else(|| config.store.path.clone());
    JsonFileStore::open(path)
}
