//! Application configuration.
//!
//! Precedence: defaults < JSON file < `SFR_*` environment < CLI flags. The CLI
//! layer is applied by the binary on top of [`AppConfig::load`].
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "retriever.json";

/// Upper bound for a single retrieval, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Prefix of the environment layer, e.g. `SFR_SERVER_URL`, `SFR_TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "SFR_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),
}

/// Remote server the backend connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL that remote names are resolved against. `None` leaves the
    /// connection closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            user_agent: format!("simple-file-retriever/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Directory local names are resolved under.
    pub download_dir: PathBuf,
    /// Bound on one retrieval; `0` waits indefinitely.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            download_dir: PathBuf::from("downloads"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Loads config from defaults/file/env.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Ok(Self::figment(&file).extract()?)
    }

    /// Layered provider chain behind [`AppConfig::load`].
    pub fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Json::file(file))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                // credentials and url live under `server`
                if key == "server_url" {
                    "server.url".into()
                } else if key == "username" {
                    "server.username".into()
                } else if key == "password" {
                    "server.password".into()
                } else {
                    key.into()
                }
            }))
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
