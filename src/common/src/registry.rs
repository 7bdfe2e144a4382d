use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::collections::HashSet;

/// Source of truth for which workspace machines are alive.
#[automock]
#[async_trait]
pub trait MachineRegistry: Send + Sync {
    /// Whether a machine with `machine_id` currently exists.
    ///
    /// An `Err` means the registry could not answer, which is not the same as
    /// the machine being gone.
    async fn exists(&self, machine_id: &str) -> Result<bool>;
}

/// Registry over a fixed set of machine ids.
#[derive(Debug, Clone, Default)]
pub struct StaticMachineRegistry {
    machines: HashSet<String>,
}

impl StaticMachineRegistry {
    pub fn new<I, S>(machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            machines: machines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

#[async_trait]
impl MachineRegistry for StaticMachineRegistry {
    async fn exists(&self, machine_id: &str) -> Result<bool> {
        Ok(self.machines.contains(machine_id))
    }
}
