use std::path::PathBuf;

use super::require;
use crate::error::{DockerError, DockerResult};
use crate::json::{AuthConfig, AuthConfigs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectImageParams {
    pub(crate) image: String,
}

impl InspectImageParams {
    pub fn new(image: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            image: require("image", image)?,
        })
    }
}

/// `POST /build` from local files packed into the build context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildImageParams {
    pub(crate) files: Vec<PathBuf>,
    pub(crate) repository: Option<String>,
    pub(crate) auth_configs: Option<AuthConfigs>,
    pub(crate) do_force_pull: Option<bool>,
    pub(crate) memory_limit: Option<i64>,
    pub(crate) memory_swap_limit: Option<i64>,
}

impl BuildImageParams {
    pub fn new<I, P>(files: I) -> DockerResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        if files.is_empty() {
            return Err(DockerError::invalid_argument(
                "build context needs at least one file",
            ));
        }
        Ok(Self {
            files,
            repository: None,
            auth_configs: None,
            do_force_pull: None,
            memory_limit: None,
            memory_swap_limit: None,
        })
    }

    /// Repository (and optional tag) to name the built image with.
    pub fn with_repository(mut self, repository: impl Into<String>) -> DockerResult<Self> {
        self.repository = Some(require("repository", repository)?);
        Ok(self)
    }

    pub fn with_auth_configs(mut self, auth_configs: AuthConfigs) -> Self {
        self.auth_configs = Some(auth_configs);
        self
    }

    pub fn with_do_force_pull(mut self, force_pull: bool) -> Self {
        self.do_force_pull = Some(force_pull);
        self
    }

    /// Bytes.
    pub fn with_memory_limit(mut self, limit: i64) -> Self {
        self.memory_limit = Some(limit);
        self
    }

    /// Memory plus swap in bytes; `-1` disables swap limiting.
    pub fn with_memory_swap_limit(mut self, limit: i64) -> Self {
        self.memory_swap_limit = Some(limit);
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullParams {
    pub(crate) image: String,
    pub(crate) tag: Option<String>,
    pub(crate) registry: Option<String>,
    pub(crate) auth_config: Option<AuthConfig>,
}

impl PullParams {
    pub fn new(image: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            image: require("image", image)?,
            tag: None,
            registry: None,
            auth_config: None,
        })
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = Some(auth_config);
        self
    }

    /// `registry/image`, or just `image` without a registry.
    pub fn full_repository(&self) -> String {
        match &self.registry {
            Some(registry) => format!("{}/{}", registry, self.image),
            None => self.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushParams {
    pub(crate) repository: String,
    pub(crate) tag: Option<String>,
    pub(crate) registry: Option<String>,
    pub(crate) auth_config: Option<AuthConfig>,
}

impl PushParams {
    pub fn new(repository: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            repository: require("repository", repository)?,
            tag: None,
            registry: None,
            auth_config: None,
        })
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = Some(auth_config);
        self
    }

    pub fn full_repository(&self) -> String {
        match &self.registry {
            Some(registry) => format!("{}/{}", registry, self.repository),
            None => self.repository.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParams {
    pub(crate) image: String,
    pub(crate) repository: String,
    pub(crate) tag: Option<String>,
    pub(crate) force: Option<bool>,
}

impl TagParams {
    pub fn new(image: impl Into<String>, repository: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            image: require("image", image)?,
            repository: require("repository", repository)?,
            tag: None,
            force: None,
        })
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitParams {
    pub(crate) container: String,
    pub(crate) repository: String,
    pub(crate) tag: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) author: Option<String>,
}

impl CommitParams {
    pub fn new(container: impl Into<String>, repository: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            container: require("container", container)?,
            repository: require("repository", repository)?,
            tag: None,
            comment: None,
            author: None,
        })
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveImageParams {
    pub(crate) image: String,
    pub(crate) force: Option<bool>,
}

impl RemoveImageParams {
    pub fn new(image: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            image: require("image", image)?,
            force: None,
        })
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }
}
