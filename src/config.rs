use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::server::listener::{DEFAULT_BACKLOG, DEFAULT_SERVER_NAME};

/// Environment variable naming the YAML configuration file.
pub const CONFIG_ENV: &str = "PORTHOLE_CONFIG";

/// Environment variable overriding the listen address, e.g. `0.0.0.0:3000`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    /// Mounts the echo handler under `/_echo`.
    pub diagnostics: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub backlog: u32,
    /// Value of the `Server` response header.
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            backlog: DEFAULT_BACKLOG,
            name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root.
    pub root: PathBuf,
    /// File served for directory paths ending in `/`.
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public"),
            index: "index.html".to_string(),
        }
    }
}

impl Config {
    /// Loads the file named by `PORTHOLE_CONFIG` (defaults when unset or
    /// unreadable), then applies the `LISTEN` override.
    pub fn load() -> Self {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path).unwrap_or_else(|err| {
                tracing::warn!("{:#}; falling back to default config", err);
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        if let Ok(listen) = std::env::var(LISTEN_ENV) {
            if let Err(err) = cfg.apply_listen(&listen) {
                tracing::warn!("{:#}", err);
            }
        }

        cfg
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overrides address and port from an `ip:port` string.
    pub fn apply_listen(&mut self, listen: &str) -> anyhow::Result<()> {
        let addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("invalid {} value {:?}", LISTEN_ENV, listen))?;
        self.server.address = addr.ip();
        self.server.port = addr.port();
        Ok(())
    }
}
