pub mod cleaner;
pub mod daemon;
pub mod registry;

pub use cleaner::{CleanupReport, ContainerCleaner, ContainerOperations};
pub use daemon::CleanupDaemon;
pub use registry::{build_registry, HttpMachineRegistry};
