//! Cluster boundary used by the chaos controller

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::chaos::{AgentRecord, ResourceHandle, ResourceKind};
use crate::error::AgentResult;

/// Operations the agent needs from the Kubernetes control plane.
///
/// Every call acts on the live cluster object; implementations keep no cache.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Cluster: Send + Sync {
    /// List every ChaosAgent object across all namespaces
    async fn list_agents(&self) -> AgentResult<Vec<AgentRecord>>;

    /// List resources of `kind` across all namespaces.
    ///
    /// An empty `field_selector` means no server-side filtering.
    async fn list(&self, kind: ResourceKind, field_selector: &str)
        -> AgentResult<Vec<ResourceHandle>>;

    /// Delete the resource behind `handle`
    async fn delete(&self, handle: &ResourceHandle) -> AgentResult<()>;

    /// Write the payload of `handle` back to the cluster
    async fn update(&self, handle: &ResourceHandle) -> AgentResult<()>;
}
