use super::require;
use crate::error::{DockerError, DockerResult};
use crate::filters::Filters;
use crate::json::ContainerConfig;

/// `GET /containers/json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListContainersParams {
    pub(crate) all: Option<bool>,
    pub(crate) limit: Option<u32>,
    pub(crate) since: Option<String>,
    pub(crate) before: Option<String>,
    pub(crate) size: Option<bool>,
    pub(crate) filters: Option<Filters>,
}

impl ListContainersParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all(mut self, all: bool) -> Self {
        self.all = Some(all);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_since(mut self, container: impl Into<String>) -> Self {
        self.since = Some(container.into());
        self
    }

    pub fn with_before(mut self, container: impl Into<String>) -> Self {
        self.before = Some(container.into());
        self
    }

    pub fn with_size(mut self, size: bool) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn all(&self) -> Option<bool> {
        self.all
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectContainerParams {
    pub(crate) container: String,
    pub(crate) return_container_size: Option<bool>,
}

impl InspectContainerParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            return_container_size: None,
        })
    }

    pub fn with_return_container_size(mut self, size: bool) -> Self {
        self.return_container_size = Some(size);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateContainerParams {
    pub(crate) container_config: ContainerConfig,
    pub(crate) container_name: Option<String>,
}

impl CreateContainerParams {
    pub fn new(container_config: ContainerConfig) -> DockerResult<Self> {
        require("container_config.image", container_config.image.as_str())?;
        Ok(Self {
            container_config,
            container_name: None,
        })
    }

    pub fn with_container_name(mut self, name: impl Into<String>) -> DockerResult<Self> {
        self.container_name = Some(require("container_name", name)?);
        Ok(self)
    }

    pub fn container_config(&self) -> &ContainerConfig {
        &self.container_config
    }
}

/// Params that only name a container.
macro_rules! container_params {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub(crate) container: String,
        }

        impl $name {
            pub fn new(container: impl Into<String>) -> DockerResult<Self> {
                Ok(Self {
                    container: require("container", container)?,
                })
            }

            pub fn container(&self) -> &str {
                &self.container
            }
        }
    };
}

container_params!(
    /// `POST /containers/{id}/start`.
    StartContainerParams
);
container_params!(
    /// `POST /containers/{id}/wait`.
    WaitContainerParams
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopContainerParams {
    pub(crate) container: String,
    pub(crate) timeout: Option<u64>,
}

impl StopContainerParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            timeout: None,
        })
    }

    /// Seconds the daemon waits before killing the container.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillContainerParams {
    pub(crate) container: String,
    pub(crate) signal: Option<i32>,
}

impl KillContainerParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            signal: None,
        })
    }

    pub fn with_signal(mut self, signal: i32) -> DockerResult<Self> {
        if signal <= 0 {
            return Err(DockerError::invalid_argument(format!(
                "signal must be positive, got {signal}"
            )));
        }
        self.signal = Some(signal);
        Ok(self)
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveContainerParams {
    pub(crate) container: String,
    pub(crate) force: Option<bool>,
    pub(crate) remove_volumes: Option<bool>,
}

impl RemoveContainerParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            force: None,
            remove_volumes: None,
        })
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    pub fn with_remove_volumes(mut self, remove_volumes: bool) -> Self {
        self.remove_volumes = Some(remove_volumes);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopParams {
    pub(crate) container: String,
    pub(crate) ps_args: Option<String>,
}

impl TopParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            ps_args: None,
        })
    }

    pub fn with_ps_args(mut self, ps_args: impl Into<String>) -> Self {
        self.ps_args = Some(ps_args.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachContainerParams {
    pub(crate) container: String,
    pub(crate) stream: Option<bool>,
    pub(crate) logs: Option<bool>,
}

impl AttachContainerParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            stream: None,
            logs: None,
        })
    }

    /// Keep the connection open and follow new output.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Replay output produced before attaching.
    pub fn with_logs(mut self, logs: bool) -> Self {
        self.logs = Some(logs);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLogsParams {
    pub(crate) container: String,
    pub(crate) follow: Option<bool>,
    pub(crate) timestamps: Option<bool>,
    pub(crate) tail: Option<String>,
    pub(crate) since: Option<i64>,
}

impl ContainerLogsParams {
    pub fn new(container: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            follow: None,
            timestamps: None,
            tail: None,
            since: None,
        })
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = Some(follow);
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// Number of trailing lines, or `all`.
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    /// Unix seconds.
    pub fn with_since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }
}
