//! Removal of containers whose workspace machine no longer exists.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dockhand_client::json::ContainerListEntry;
use dockhand_client::params::{KillContainerParams, RemoveContainerParams};
use dockhand_client::{DockerConnector, DockerResult};
use dockhand_common::naming;
use dockhand_common::registry::MachineRegistry;
use mockall::automock;
use tracing::{debug, error, info, warn};

/// The container calls a cleanup pass needs.
#[automock]
#[async_trait]
pub trait ContainerOperations: Send + Sync {
    async fn list_containers(&self) -> DockerResult<Vec<ContainerListEntry>>;
    async fn kill_container(&self, container_id: &str) -> DockerResult<()>;
    /// Forced, together with the container's anonymous volumes.
    async fn remove_container(&self, container_id: &str) -> DockerResult<()>;
}

#[async_trait]
impl ContainerOperations for DockerConnector {
    async fn list_containers(&self) -> DockerResult<Vec<ContainerListEntry>> {
        DockerConnector::list_containers(self).await
    }

    async fn kill_container(&self, container_id: &str) -> DockerResult<()> {
        DockerConnector::kill_container(self, KillContainerParams::new(container_id)?).await
    }

    async fn remove_container(&self, container_id: &str) -> DockerResult<()> {
        let params = RemoveContainerParams::new(container_id)?
            .with_force(true)
            .with_remove_volumes(true);
        DockerConnector::remove_container(self, params).await
    }
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub containers_seen: usize,
    pub orphans_found: usize,
    pub killed: usize,
    pub removed: usize,
    /// Set when the container list could not be fetched and the pass was
    /// abandoned.
    pub listing_error: Option<String>,
    pub errors: Vec<String>,
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.listing_error {
            return write!(f, "cleanup skipped: {}", error);
        }
        write!(
            f,
            "{} containers seen, {} orphaned, {} killed, {} removed, {} errors",
            self.containers_seen,
            self.orphans_found,
            self.killed,
            self.removed,
            self.errors.len()
        )
    }
}

/// Finds containers named after machines the registry no longer knows and
/// kills and removes them.
///
/// Passes keep no state between runs. Failures on one container are logged
/// and never stop the pass; the next pass is the retry.
#[derive(Clone)]
pub struct ContainerCleaner {
    containers: Arc<dyn ContainerOperations>,
    registry: Arc<dyn MachineRegistry>,
}

impl ContainerCleaner {
    pub fn new(
        containers: Arc<dyn ContainerOperations>,
        registry: Arc<dyn MachineRegistry>,
    ) -> Self {
        Self {
            containers,
            registry,
        }
    }

    pub async fn run_once(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        let containers = match self.containers.list_containers().await {
            Ok(containers) => containers,
            Err(e) => {
                error!(error = %e, "failed to list containers, skipping cleanup pass");
                report.listing_error = Some(e.to_string());
                return report;
            }
        };
        report.containers_seen = containers.len();

        for container in &containers {
            self.inspect(container, &mut report).await;
        }

        debug!(%report, "cleanup pass done");
        report
    }

    async fn inspect(&self, container: &ContainerListEntry, report: &mut CleanupReport) {
        let Some(identity) = container.first_name().and_then(naming::decode) else {
            return;
        };

        match self.registry.exists(&identity.machine_id).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                warn!(
                    container = %container.id,
                    machine = %identity.machine_id,
                    error = %e,
                    "could not check machine, leaving container alone"
                );
                report
                    .errors
                    .push(format!("{}: machine lookup failed: {}", container.id, e));
                return;
            }
        }

        report.orphans_found += 1;
        info!(
            container = %container.id,
            status = %container.status,
            %identity,
            "removing orphaned container"
        );

        if container.is_running() {
            match self.containers.kill_container(&container.id).await {
                Ok(()) => report.killed += 1,
                Err(e) => {
                    warn!(container = %container.id, error = %e, "failed to kill orphaned container");
                    report
                        .errors
                        .push(format!("{}: kill failed: {}", container.id, e));
                }
            }
        }

        match self.containers.remove_container(&container.id).await {
            Ok(()) => report.removed += 1,
            Err(e) => {
                warn!(container = %container.id, error = %e, "failed to remove orphaned container");
                report
                    .errors
                    .push(format!("{}: remove failed: {}", container.id, e));
            }
        }
    }
}
