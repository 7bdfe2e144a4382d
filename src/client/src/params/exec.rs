use super::require;
use crate::error::{DockerError, DockerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExecParams {
    pub(crate) container: String,
    pub(crate) cmd: Vec<String>,
    pub(crate) detach: Option<bool>,
}

impl CreateExecParams {
    /// `cmd` must be non-empty and its first element must name a program.
    pub fn new<I, S>(container: impl Into<String>, cmd: I) -> DockerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let container = require("container", container)?;
        let cmd: Vec<String> = cmd.into_iter().map(Into::into).collect();
        match cmd.first() {
            None => return Err(DockerError::invalid_argument("exec command must not be empty")),
            Some(program) if program.trim().is_empty() => {
                return Err(DockerError::invalid_argument(
                    "first element of exec command must not be empty",
                ))
            }
            Some(_) => {}
        }
        Ok(Self {
            container,
            cmd,
            detach: None,
        })
    }

    /// A detached exec does not attach stdout and stderr.
    pub fn with_detach(mut self, detach: bool) -> Self {
        self.detach = Some(detach);
        self
    }

    pub fn cmd(&self) -> &[String] {
        &self.cmd
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartExecParams {
    pub(crate) exec_id: String,
    pub(crate) detach: Option<bool>,
    pub(crate) tty: Option<bool>,
}

impl StartExecParams {
    pub fn new(exec_id: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            exec_id: require("exec_id", exec_id)?,
            detach: None,
            tty: None,
        })
    }

    pub fn with_detach(mut self, detach: bool) -> Self {
        self.detach = Some(detach);
        self
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetExecInfoParams {
    pub(crate) exec_id: String,
}

impl GetExecInfoParams {
    pub fn new(exec_id: impl Into<String>) -> DockerResult<Self> {
        Ok(Self {
            exec_id: require("exec_id", exec_id)?,
        })
    }
}
