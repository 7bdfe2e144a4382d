use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Credentials for one registry, as the daemon expects them in
/// `X-Registry-Auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub serveraddress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthConfig {
    pub fn new(
        serveraddress: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            serveraddress: serveraddress.into(),
            email: None,
        }
    }
}

/// Credentials keyed by registry address, sent with builds in
/// `X-Registry-Config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthConfigs {
    pub configs: HashMap<String, AuthConfig>,
}

impl AuthConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, config: AuthConfig) {
        self.configs.insert(config.serveraddress.clone(), config);
    }

    pub fn get(&self, registry: &str) -> Option<&AuthConfig> {
        self.configs.get(registry)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl FromIterator<AuthConfig> for AuthConfigs {
    fn from_iter<I: IntoIterator<Item = AuthConfig>>(iter: I) -> Self {
        let mut configs = AuthConfigs::new();
        for config in iter {
            configs.insert(config);
        }
        configs
    }
}
