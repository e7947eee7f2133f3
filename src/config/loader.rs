use std::{fs, fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use config::{Config, Environment};
use log::info;
use serde::Deserialize;

/// Default duration of a single request/response exchange, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default TCP connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Transport-level settings for an [`AdminClient`](crate::AdminClient).
///
/// Values come from [`load_configuration`] (TOML file plus `ADMINRPC_*`
/// environment overrides) or from [`ClientConfig::default`] when the
/// caller configures programmatically.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum duration of a request/response exchange, in seconds.
    pub timeout_secs: u64,
    /// TCP connect timeout, in seconds.
    pub connect_timeout_secs: u64,
    /// Use HTTPS for the administration endpoint.
    pub use_tls: bool,
    /// Accept self-signed or otherwise invalid server certificates.
    /// Administration endpoints frequently ship with self-signed
    /// certificates; enable only for trusted hosts.
    pub accept_invalid_certs: bool,
    /// Override the User-Agent header. When unset, the client derives one
    /// from the application identity.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            use_tls: true,
            accept_invalid_certs: false,
            user_agent: None,
        }
    }
}

pub fn get_default_config() -> &'static str {
    include_str!("../../config/config.toml")
}

/// Loads client configuration from `path`, creating the file with defaults
/// if it does not exist. Environment variables prefixed `ADMINRPC_`
/// override file values.
pub fn load_configuration(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        write_config_to(path, get_default_config()).context("Could not create default config")?;
        info!(path:% = path.display(); "Created new configuration file");
    }

    let filename = path.to_str().context("Invalid config file path")?;

    let cfg = Config::builder()
        .add_source(config::File::with_name(filename))
        .add_source(
            Environment::with_prefix("ADMINRPC")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Could not build configuration")?;

    cfg.try_deserialize::<ClientConfig>()
        .context("Invalid configuration values")
}

pub fn write_config_to(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create parent directories")?;
    };

    let mut file = File::create(path).context("Failed to create config file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write config content")?;
    file.write_all(b"\n").context("Failed to write newline")?;
    Ok(())
}
