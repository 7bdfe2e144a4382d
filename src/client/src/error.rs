use std::fmt;

/// Errors returned by [`DockerConnector`](crate::DockerConnector) operations.
#[derive(Debug)]
pub enum DockerError {
    /// Daemon answered with a non-2xx status, or reported an error inline in a
    /// progress stream.
    Daemon { status: u16, message: String },

    /// Daemon answered 2xx but the stream ended without the expected marker.
    StreamProtocol(String),

    /// Request parameters were rejected before anything was sent.
    InvalidArgument(String),

    /// Could not reach the daemon or the connection broke mid-request.
    Transport(String),

    /// Local I/O, such as packing a build context.
    Io(std::io::Error),

    /// Daemon sent JSON we could not parse.
    Json(serde_json::Error),
}

impl fmt::Display for DockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerError::Daemon { status, message } => {
                write!(f, "Docker daemon error {}: {}", status, message)
            }
            DockerError::StreamProtocol(message) => write!(f, "{}", message),
            DockerError::InvalidArgument(message) => write!(f, "Invalid argument: {}", message),
            DockerError::Transport(message) => {
                write!(f, "Failed to talk to Docker daemon: {}", message)
            }
            DockerError::Io(e) => write!(f, "I/O error: {}", e),
            DockerError::Json(e) => write!(f, "Malformed JSON from Docker daemon: {}", e),
        }
    }
}

impl std::error::Error for DockerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockerError::Io(e) => Some(e),
            DockerError::Json(e) => Some(e),
            DockerError::Daemon { .. }
            | DockerError::StreamProtocol(_)
            | DockerError::InvalidArgument(_)
            | DockerError::Transport(_) => None,
        }
    }
}

impl From<std::io::Error> for DockerError {
    fn from(err: std::io::Error) -> Self {
        DockerError::Io(err)
    }
}

impl From<serde_json::Error> for DockerError {
    fn from(err: serde_json::Error) -> Self {
        DockerError::Json(err)
    }
}

impl From<reqwest::Error> for DockerError {
    fn from(err: reqwest::Error) -> Self {
        DockerError::Transport(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for DockerError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        DockerError::Transport(err.to_string())
    }
}

impl From<hyper::Error> for DockerError {
    fn from(err: hyper::Error) -> Self {
        DockerError::Transport(err.to_string())
    }
}

impl DockerError {
    pub fn daemon(status: u16, message: impl Into<String>) -> Self {
        DockerError::Daemon {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DockerError::InvalidArgument(message.into())
    }

    /// Status code reported by the daemon, if this is a daemon error.
    pub fn status(&self) -> Option<u16> {
        match self {
            DockerError::Daemon { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The target container, image or exec instance does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type DockerResult<T> = Result<T, DockerError>;
