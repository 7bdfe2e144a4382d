use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, DEFAULT_CLEANUP_PERIOD_MIN,
    DEFAULT_DOCKER_CONNECT_TIMEOUT_SECS, DEFAULT_DOCKER_ENDPOINT, DEFAULT_LOG_LEVEL,
    MAX_CLEANUP_PERIOD_MIN,
};

/// Credentials for one image registry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub docker_endpoint: String,
    pub docker_connect_timeout_secs: u64,
    pub docker_api_version: Option<String>,

    pub cleanup_period_min: u64,

    pub machine_api_endpoint: Option<String>,
    pub known_machines: Vec<String>,

    #[serde(default)]
    pub registry_auth: HashMap<String, RegistryCredentials>,

    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_period_min.saturating_mul(60))
    }

    pub fn docker_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.docker_connect_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.cleanup_period_min == 0 || self.cleanup_period_min > MAX_CLEANUP_PERIOD_MIN {
            bail!(
                "cleanup_period_min must be between 1 and {}, got {}",
                MAX_CLEANUP_PERIOD_MIN,
                self.cleanup_period_min
            );
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// `$HOME/.config/dockhand/config.toml`, if a home directory is known.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME)
        })
    }

    pub fn load_default_config() -> Result<Config> {
        Self::load_config(None)
    }

    /// Loads defaults, then the TOML file, then `DOCKHAND_*` environment
    /// variables. An explicit `path` must exist; the default path is optional.
    pub fn load_config(path: Option<&Path>) -> Result<Config> {
        let mut builder = RConfig::builder();

        builder = builder
            .set_default("docker_endpoint", DEFAULT_DOCKER_ENDPOINT)?
            .set_default(
                "docker_connect_timeout_secs",
                DEFAULT_DOCKER_CONNECT_TIMEOUT_SECS,
            )?
            .set_default("docker_api_version", None::<String>)?
            .set_default("cleanup_period_min", DEFAULT_CLEANUP_PERIOD_MIN)?
            .set_default("machine_api_endpoint", None::<String>)?
            .set_default::<&str, Vec<&str>>("known_machines", vec![])?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("log_file", None::<String>)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => match Self::default_config_path() {
                Some(path) => builder.add_source(
                    File::from(path)
                        .format(FileFormat::Toml)
                        .required(false),
                ),
                None => builder,
            },
        };

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("known_machines"),
        );

        let config: Config = builder
            .build()
            .context("failed to read config sources")?
            .try_deserialize()
            .context("failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }
}
