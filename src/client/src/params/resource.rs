use super::require;
use crate::error::DockerResult;

/// Copy a path out of a container as a tar archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResourceParams {
    pub(crate) container: String,
    pub(crate) source_path: String,
}

impl GetResourceParams {
    pub fn new(container: impl Into<String>, source_path: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            source_path: require("source_path", source_path)?,
        })
    }
}

/// Extract a tar archive into a directory inside a container. The archive
/// itself is handed to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResourceParams {
    pub(crate) container: String,
    pub(crate) target_path: String,
    pub(crate) no_overwrite_dir_non_dir: Option<bool>,
}

impl PutResourceParams {
    pub fn new(container: impl Into<String>, target_path: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            target_path: require("target_path", target_path)?,
            no_overwrite_dir_non_dir: None,
        })
    }

    /// Fail instead of replacing a directory with a file, or the reverse.
    pub fn with_no_overwrite_dir_non_dir(mut self, no_overwrite: bool) -> Self {
        self.no_overwrite_dir_non_dir = Some(no_overwrite);
        self
    }
}
