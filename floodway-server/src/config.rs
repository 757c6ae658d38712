use std::path::{Path, PathBuf};

use clap::Parser;
use floodway_core::{NetworkConfig, SpeedProfile};
use serde::Deserialize;

use crate::error::ServerError;

/// Flood delay API server
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "floodway.toml")]
    pub config: PathBuf,
    /// Override the listen address from the configuration
    #[arg(long)]
    pub host: Option<String>,
    /// Override the listen port from the configuration
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            concurrency_limit: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Flood events CSV extract
    pub flood_events: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,
    pub network: NetworkConfig,
    pub store: StoreConfig,
    /// Defaults to 50 km/h baseline against 20 km/h flooded
    #[serde(default)]
    pub speeds: SpeedProfile,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ServerError> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply command-line overrides
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        self
    }
}
