pub mod archive;
pub mod auth;
pub mod connection;
pub mod connector;
pub mod error;
pub mod filters;
pub mod json;
pub mod params;
pub mod processor;
pub mod stream;

pub use connector::DockerConnector;
pub use error::{DockerError, DockerResult};
pub use processor::{MessageProcessor, ProgressMonitor};
