//! Kubernetes integration for the chaos agent
//!
//! Everything the agent asks of the control plane goes through the
//! [`Cluster`] trait; [`K8sClient`] is the production implementation.

mod client;
mod cluster;

pub use client::{chaos_agent_resource, K8sClient};
pub use cluster::Cluster;
#[cfg(test)]
pub use cluster::MockCluster;
