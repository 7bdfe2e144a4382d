//! Request parameters, one type per daemon operation.
//!
//! Each type has a single validating constructor taking the required values;
//! everything optional starts unset and is set through consuming `with_*`
//! methods. Unset values are left out of the request entirely, so the daemon
//! applies its own defaults.

mod container;
mod exec;
mod image;
mod resource;
mod system;

pub use container::{
    AttachContainerParams, ContainerLogsParams, CreateContainerParams, InspectContainerParams,
    KillContainerParams, ListContainersParams, RemoveContainerParams, StartContainerParams,
    StopContainerParams, TopParams, WaitContainerParams,
};
pub use exec::{CreateExecParams, GetExecInfoParams, StartExecParams};
pub use image::{
    BuildImageParams, CommitParams, InspectImageParams, PullParams, PushParams,
    RemoveImageParams, TagParams,
};
pub use resource::{GetResourceParams, PutResourceParams};
pub use system::GetEventsParams;

use crate::error::{DockerError, DockerResult};

pub(crate) fn require(name: &str, value: impl Into<String>) -> DockerResult<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(DockerError::invalid_argument(format!(
            "{name} is required and must not be empty"
        )));
    }
    Ok(value)
}
