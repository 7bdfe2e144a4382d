//! Typed bodies exchanged with the Docker Engine API.
//!
//! Field names follow the daemon's PascalCase keys through explicit serde
//! renames. Every struct tolerates missing keys, since older daemons omit
//! fields newer ones send. Collections the daemon may send as `null` (nil
//! slices and maps on its side) go through `null_as_default`.

mod auth;
mod container;
mod event;
mod exec;
mod image;
mod log;
mod progress;
mod system;

pub use auth::{AuthConfig, AuthConfigs};
pub use container::{
    ContainerConfig, ContainerCreated, ContainerExitStatus, ContainerInfo, ContainerListEntry,
    ContainerProcesses, ContainerState, HostConfig, Port, PortBinding,
};
pub use event::{Event, EventActor};
pub use exec::{Exec, ExecConfig, ExecInfo, ExecProcessConfig, ExecStart};
pub use image::{Image, ImageInfo};
pub use log::{LogMessage, LogMessageType};
pub use progress::{ErrorDetail, ProgressDetail, ProgressStatus};
pub use system::{SystemInfo, Version};

use serde::{Deserialize, Deserializer};

/// Reads `null` as the type's default, for use with `deserialize_with`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
