// ⚙️ Configuration - TOML settings shared by the CLI and the server
//
// Every field has a default, so an empty file (or no file) is a valid config.

use anyhow::{bail, Context as AnyhowContext, Result as AnyhowResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::appetite::AppetiteGuide;
use crate::plans::PlanCatalog;

/// Names the config file when `--config` is not given
pub const CONFIG_ENV_VAR: &str = "EQUINE_ELIGIBILITY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            cors_permissive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "equine_eligibility=info".to_string(),
        }
    }
}

/// Optional JSON files replacing the compiled-in datasets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub appetite_file: Option<PathBuf>,
    pub plans_file: Option<PathBuf>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> AnyhowResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then `EQUINE_ELIGIBILITY_CONFIG`, then defaults.
    pub fn load_or_default(path: Option<&Path>) -> AnyhowResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(env_path) => Self::load(PathBuf::from(env_path)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> AnyhowResult<()> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            bail!("server.bind is not a socket address: {}", self.server.bind);
        }
        if self.logging.filter.trim().is_empty() {
            bail!("logging.filter must not be empty");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> AnyhowResult<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))
    }

    pub fn appetite_guide(&self) -> AnyhowResult<AppetiteGuide> {
        match &self.data.appetite_file {
            Some(path) => AppetiteGuide::from_file(path),
            None => Ok(AppetiteGuide::with_defaults()),
        }
    }

    pub fn plan_catalog(&self) -> AnyhowResult<PlanCatalog> {
        match &self.data.plans_file {
            Some(path) => PlanCatalog::from_file(path),
            None => Ok(PlanCatalog::with_defaults()),
        }
    }
}
