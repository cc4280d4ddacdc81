//! Chaos agent configuration and resource models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

/// Kinds of workload resources the agent perturbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// A running instance of a workload
    Pod,
    /// A workload with a desired replica count
    Deployment,
    /// A key -> text mapping consumed by workloads
    ConfigMap,
}

/// The operator-authored chaos configuration, taken from the ChaosAgent spec
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Namespaces that are never listed nor targeted
    pub excluded_namespaces: BTreeSet<String>,
    /// Seconds to wait between two iterations
    pub pause_duration: u64,
    /// Minimum number of pods that must survive a termination batch
    pub tolerance: u32,
    /// Percentage chance (0-100) applied per candidate by every policy
    pub eagerness: u8,
}

/// One ChaosAgent object as discovered in the cluster
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    pub namespace: String,
    pub name: String,
    /// Raw `spec` document; parsed into [`AgentConfig`] by the config source
    pub spec: serde_json::Value,
}

impl AgentRecord {
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Kind-specific mutable part of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Pod,
    Deployment {
        replicas: i32,
    },
    ConfigMap {
        data: BTreeMap<String, String>,
        immutable: bool,
    },
}

/// Reference to one live workload resource, rebuilt every iteration
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHandle {
    pub namespace: String,
    pub name: String,
    pub payload: Payload,
}

impl ResourceHandle {
    pub fn pod(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            payload: Payload::Pod,
        }
    }

    pub fn deployment(namespace: &str, name: &str, replicas: i32) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            payload: Payload::Deployment { replicas },
        }
    }

    pub fn config_map(
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
        immutable: bool,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            payload: Payload::ConfigMap { data, immutable },
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self.payload {
            Payload::Pod => ResourceKind::Pod,
            Payload::Deployment { .. } => ResourceKind::Deployment,
            Payload::ConfigMap { .. } => ResourceKind::ConfigMap,
        }
    }

    /// Replica count, for deployments
    pub fn replicas(&self) -> Option<i32> {
        match self.payload {
            Payload::Deployment { replicas } => Some(replicas),
            _ => None,
        }
    }

    pub fn is_immutable(&self) -> bool {
        matches!(self.payload, Payload::ConfigMap { immutable: true, .. })
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.kind(), self.namespace, self.name)
    }
}

/// Why a policy left a whole batch untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Pool already smaller than the tolerance
    BelowTolerance,
    /// Deleting the marked pods would leave fewer than the tolerance
    WouldBreachTolerance,
}

/// Outcome of one policy run over one inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundReport {
    /// Resources handed to the policy
    pub candidates: usize,
    /// Resources that won the eagerness draw
    pub selected: usize,
    /// Mutations accepted by the cluster
    pub mutated: usize,
    /// Mutations rejected by the cluster
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl RoundReport {
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            ..Default::default()
        }
    }
}

/// Summary of one control loop iteration
#[derive(Debug, Clone, Serialize)]
pub struct IterationReport {
    pub iteration: u64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminations: Option<RoundReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<RoundReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corruption: Option<RoundReport>,
}

impl IterationReport {
    pub fn new(iteration: u64) -> Self {
        Self {
            iteration,
            started_at: Utc::now(),
            terminations: None,
            scaling: None,
            corruption: None,
        }
    }

    /// Total mutations accepted by the cluster during this iteration
    pub fn total_mutations(&self) -> usize {
        [&self.terminations, &self.scaling, &self.corruption]
            .into_iter()
            .flatten()
            .map(|r| r.mutated)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::Pod.to_string(), "pod");
        assert_eq!(ResourceKind::Deployment.to_string(), "deployment");
        assert_eq!(ResourceKind::ConfigMap.to_string(), "configmap");
    }

    #[test]
    fn test_handle_kind_follows_payload() {
        assert_eq!(ResourceHandle::pod("a", "p").kind(), ResourceKind::Pod);
        assert_eq!(
            ResourceHandle::deployment("a", "d", 3).kind(),
            ResourceKind::Deployment
        );
        assert_eq!(
            ResourceHandle::config_map("a", "c", BTreeMap::new(), true).kind(),
            ResourceKind::ConfigMap
        );
    }

    #[test]
    fn test_handle_display() {
        let handle = ResourceHandle::deployment("shop", "checkout", 2);
        assert_eq!(handle.to_string(), "deployment shop/checkout");
    }

    #[test]
    fn test_immutable_only_for_flagged_config_maps() {
        assert!(ResourceHandle::config_map("a", "c", BTreeMap::new(), true).is_immutable());
        assert!(!ResourceHandle::config_map("a", "c", BTreeMap::new(), false).is_immutable());
        assert!(!ResourceHandle::pod("a", "p").is_immutable());
    }

    #[test]
    fn test_agent_config_wire_format() {
        let spec = serde_json::json!({
            "excludedNamespaces": ["kube-system", "blackadder"],
            "pauseDuration": 30,
            "tolerance": 2,
            "eagerness": 10
        });

        let config: AgentConfig = serde_json::from_value(spec).unwrap();
        assert!(config.excluded_namespaces.contains("kube-system"));
        assert_eq!(config.pause_duration, 30);
        assert_eq!(config.tolerance, 2);
        assert_eq!(config.eagerness, 10);
    }

    #[test]
    fn test_total_mutations() {
        let mut report = IterationReport::new(1);
        report.terminations = Some(RoundReport {
            mutated: 2,
            ..RoundReport::new(5)
        });
        report.scaling = Some(RoundReport {
            mutated: 1,
            ..RoundReport::new(3)
        });
        assert_eq!(report.total_mutations(), 3);
    }
}
