use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dockhand_common::config_manager::Config;
use dockhand_common::registry::{MachineRegistry, StaticMachineRegistry};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

const REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Asks the workspace API whether a machine exists:
/// `GET {base}/machine/{id}` answers 2xx while it does and 404 once it is gone.
#[derive(Debug, Clone)]
pub struct HttpMachineRegistry {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMachineRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid machine API url {base_url}"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(REGISTRY_TIMEOUT)
            .build()
            .context("failed to build machine API client")?;
        Ok(Self { client, base_url })
    }

    fn machine_url(&self, machine_id: &str) -> Result<Url> {
        let mut url = self.base_url.join("machine/")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("machine API url cannot be a base"))?
            .pop_if_empty()
            .push(machine_id);
        Ok(url)
    }
}

#[async_trait]
impl MachineRegistry for HttpMachineRegistry {
    async fn exists(&self, machine_id: &str) -> Result<bool> {
        let url = self.machine_url(machine_id)?;
        debug!(%url, "checking machine");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("machine API request to {url} failed"))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("machine API answered {} for {}: {}", status, machine_id, body)
            }
        }
    }
}

/// Registry selected by configuration: the machine API when an endpoint is
/// set, otherwise the configured list of known machines.
pub fn build_registry(config: &Config) -> Result<Arc<dyn MachineRegistry>> {
    match &config.machine_api_endpoint {
        Some(endpoint) => Ok(Arc::new(HttpMachineRegistry::new(endpoint)?)),
        None => {
            let registry = StaticMachineRegistry::new(config.known_machines.iter().cloned());
            if registry.is_empty() {
                warn!("no machine API and no known machines configured; every workspace container counts as orphaned");
            }
            Ok(Arc::new(registry))
        }
    }
}
