//! Registry credential headers.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::DockerResult;
use crate::json::{AuthConfig, AuthConfigs};
use dockhand_common::config_manager::RegistryCredentials;

pub const REGISTRY_AUTH_HEADER: &str = "X-Registry-Auth";
pub const REGISTRY_CONFIG_HEADER: &str = "X-Registry-Config";

/// Value of `X-Registry-Auth` for one registry; `{}` when there are no
/// credentials.
pub fn auth_header(config: Option<&AuthConfig>) -> DockerResult<String> {
    let json = match config {
        Some(config) => serde_json::to_vec(config)?,
        None => b"{}".to_vec(),
    };
    Ok(URL_SAFE.encode(json))
}

/// Value of `X-Registry-Config` carrying every known registry.
pub fn config_header(configs: &AuthConfigs) -> DockerResult<String> {
    Ok(URL_SAFE.encode(serde_json::to_vec(configs)?))
}

/// Credentials configured up front, used when a call brings none of its own.
#[derive(Debug, Clone, Default)]
pub struct InitialAuthConfig {
    configs: AuthConfigs,
}

impl InitialAuthConfig {
    pub fn new(configs: AuthConfigs) -> Self {
        Self { configs }
    }

    pub fn from_credentials(credentials: &HashMap<String, RegistryCredentials>) -> Self {
        let configs = credentials
            .iter()
            .map(|(registry, creds)| AuthConfig {
                username: creds.username.clone(),
                password: creds.password.clone(),
                serveraddress: registry.clone(),
                email: creds.email.clone(),
            })
            .collect();
        Self { configs }
    }

    pub fn configs(&self) -> &AuthConfigs {
        &self.configs
    }

    /// `X-Registry-Auth` for `registry`, preferring the call's own credentials.
    pub fn auth_header_for(
        &self,
        registry: Option<&str>,
        explicit: Option<&AuthConfig>,
    ) -> DockerResult<String> {
        let config = explicit.or_else(|| registry.and_then(|r| self.configs.get(r)));
        auth_header(config)
    }

    /// Configured credentials overlaid with the call's own.
    pub fn merged_with(&self, explicit: Option<&AuthConfigs>) -> AuthConfigs {
        let mut merged = self.configs.clone();
        if let Some(explicit) = explicit {
            for config in explicit.configs.values() {
                merged.insert(config.clone());
            }
        }
        merged
    }
}
