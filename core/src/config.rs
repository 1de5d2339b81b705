use crate::model::Host;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InventoryConfig {
    #[serde(default)]
    pub hosts: Vec<Host>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
    pub current_file: String,
    pub previous_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    pub workers: usize,
    pub command: String,
    /// Per-device deadline. Zero disables it.
    pub timeout_ms: u64,
    pub capture_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub inventory: InventoryConfig,
    pub storage: StorageConfig,
    pub collection: CollectionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("TOPOMAP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        builder.build()?.try_deserialize()
    }

    /// Load from a single file, still honoring built-in defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref().to_path_buf()));

        builder.build()?.try_deserialize()
    }

    pub fn current_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.current_file)
    }

    pub fn previous_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.previous_file)
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("storage.data_dir", "data")?
        .set_default("storage.current_file", "topology.json")?
        .set_default("storage.previous_file", "topology_previous.json")?
        .set_default("collection.workers", 20)?
        .set_default("collection.command", "show lldp neighbors")?
        .set_default("collection.timeout_ms", 30_000)?
        .set_default("collection.capture_dir", "captures")
}
