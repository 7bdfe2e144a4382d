use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::DockerResult;

/// Docker's `filters` query value: a JSON map from filter name to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Filters {
    filters: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Restarting,
    Running,
    Paused,
    Exited,
}

impl ContainerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Running => "running",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Exited => "exited",
        }
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_filter("label", label)
    }

    pub fn with_status(self, status: ContainerStatus) -> Self {
        self.with_filter("status", status.as_str())
    }

    pub fn with_exit_code(self, code: i32) -> Self {
        self.with_filter("exited", code.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_query_value(&self) -> DockerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
