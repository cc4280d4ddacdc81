//! In-memory cluster used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use blackadder::chaos::{AgentRecord, ResourceHandle, ResourceKind};
use blackadder::error::{AgentError, AgentResult};
use blackadder::k8s::Cluster;

/// Cluster state kept in memory, keyed by `(kind, namespace, name)`.
///
/// Field selectors are ignored on purpose so exclusion is checked end to end.
#[derive(Default)]
pub struct FakeCluster {
    agents: Vec<AgentRecord>,
    objects: Mutex<BTreeMap<(String, String, String), ResourceHandle>>,
    failing: Mutex<Vec<String>>,
    failing_kinds: Vec<ResourceKind>,
    pub selectors: Mutex<Vec<String>>,
}

fn key(handle: &ResourceHandle) -> (String, String, String) {
    (
        handle.kind().to_string(),
        handle.namespace.clone(),
        handle.name.clone(),
    )
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, namespace: &str, name: &str, spec: serde_json::Value) -> Self {
        self.agents.push(AgentRecord {
            namespace: namespace.to_string(),
            name: name.to_string(),
            spec,
        });
        self
    }

    pub fn with(self, handle: ResourceHandle) -> Self {
        self.objects.lock().unwrap().insert(key(&handle), handle);
        self
    }

    pub fn with_pods(self, namespace: &str, count: usize) -> Self {
        (0..count).fold(self, |cluster, i| {
            cluster.with(ResourceHandle::pod(namespace, &format!("pod-{}", i)))
        })
    }

    /// Make every delete/update of the named object fail
    pub fn failing_on(self, name: &str) -> Self {
        self.failing.lock().unwrap().push(name.to_string());
        self
    }

    /// Make listing of `kind` fail
    pub fn failing_list(mut self, kind: ResourceKind) -> Self {
        self.failing_kinds.push(kind);
        self
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.objects
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.kind() == kind)
            .count()
    }

    pub fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<ResourceHandle> {
        self.objects
            .lock()
            .unwrap()
            .get(&(kind.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn snapshot(&self, kind: ResourceKind) -> Vec<ResourceHandle> {
        self.objects
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.kind() == kind)
            .cloned()
            .collect()
    }

    fn check_failing(&self, handle: &ResourceHandle) -> AgentResult<()> {
        if self.failing.lock().unwrap().contains(&handle.name) {
            return Err(AgentError::internal(&format!("{} refused", handle)));
        }
        Ok(())
    }
}

#[async_trait]
impl Cluster for FakeCluster {
    async fn list_agents(&self) -> AgentResult<Vec<AgentRecord>> {
        Ok(self.agents.clone())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        field_selector: &str,
    ) -> AgentResult<Vec<ResourceHandle>> {
        self.selectors.lock().unwrap().push(field_selector.to_string());
        if self.failing_kinds.contains(&kind) {
            return Err(AgentError::internal(&format!("cannot list {}", kind)));
        }
        Ok(self.snapshot(kind))
    }

    async fn delete(&self, handle: &ResourceHandle) -> AgentResult<()> {
        self.check_failing(handle)?;
        self.objects
            .lock()
            .unwrap()
            .remove(&key(handle))
            .map(|_| ())
            .ok_or_else(|| AgentError::internal(&format!("{} not found", handle)))
    }

    async fn update(&self, handle: &ResourceHandle) -> AgentResult<()> {
        self.check_failing(handle)?;
        let mut objects = self.objects.lock().unwrap();
        match objects.get_mut(&key(handle)) {
            Some(existing) => {
                *existing = handle.clone();
                Ok(())
            }
            None => Err(AgentError::internal(&format!("{} not found", handle))),
        }
    }
}
