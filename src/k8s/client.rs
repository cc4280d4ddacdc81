//! Kubernetes client wrapper for the chaos agent

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::{
    api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    discovery::ApiResource,
    Client, Config,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::cluster::Cluster;
use crate::chaos::{AgentRecord, Payload, ResourceHandle, ResourceKind};
use crate::error::{AgentError, AgentResult};

/// Replica count Kubernetes assumes when a deployment does not declare one
const DEFAULT_REPLICAS: i32 = 1;

/// Wrapper around kube::Client implementing [`Cluster`]
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Create a new K8sClient from an explicit kubeconfig file, or from the
    /// in-cluster / KUBECONFIG configuration when no path is given
    #[instrument(skip_all)]
    pub async fn new(kubeconfig_path: Option<&str>) -> Result<Self> {
        let config = match kubeconfig_path {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
            }
            None => Config::infer().await?,
        };
        let client = Client::try_from(config)?;

        info!("Connected to Kubernetes cluster");

        Ok(Self { client })
    }

    /// API for the ChaosAgent custom resource in every namespace
    fn agents(&self) -> Api<DynamicObject> {
        Api::all_with(self.client.clone(), &chaos_agent_resource())
    }
}

/// Definition of the ChaosAgent custom resource
pub fn chaos_agent_resource() -> ApiResource {
    ApiResource {
        group: "blackadder.io".to_string(),
        version: "v1beta1".to_string(),
        api_version: "blackadder.io/v1beta1".to_string(),
        kind: "ChaosAgent".to_string(),
        plural: "chaosagents".to_string(),
    }
}

fn list_params(field_selector: &str) -> ListParams {
    if field_selector.is_empty() {
        ListParams::default()
    } else {
        ListParams::default().fields(field_selector)
    }
}

fn agent_record(obj: DynamicObject) -> AgentRecord {
    AgentRecord {
        namespace: obj.metadata.namespace.unwrap_or_default(),
        name: obj.metadata.name.unwrap_or_default(),
        spec: obj.data.get("spec").cloned().unwrap_or(Value::Null),
    }
}

fn pod_handle(pod: Pod) -> Option<ResourceHandle> {
    let namespace = pod.metadata.namespace?;
    let name = pod.metadata.name?;
    Some(ResourceHandle::pod(&namespace, &name))
}

fn deployment_handle(deployment: Deployment) -> Option<ResourceHandle> {
    let namespace = deployment.metadata.namespace?;
    let name = deployment.metadata.name?;
    let replicas = deployment
        .spec
        .and_then(|s| s.replicas)
        .unwrap_or(DEFAULT_REPLICAS);
    Some(ResourceHandle::deployment(&namespace, &name, replicas))
}

fn config_map_handle(config_map: ConfigMap) -> Option<ResourceHandle> {
    let namespace = config_map.metadata.namespace?;
    let name = config_map.metadata.name?;
    Some(ResourceHandle::config_map(
        &namespace,
        &name,
        config_map.data.unwrap_or_default(),
        config_map.immutable.unwrap_or(false),
    ))
}

/// Merge patch writing the mutable payload of a handle
fn update_patch(handle: &ResourceHandle) -> AgentResult<Value> {
    match &handle.payload {
        Payload::Deployment { replicas } => Ok(json!({ "spec": { "replicas": replicas } })),
        Payload::ConfigMap { data, .. } => Ok(json!({ "data": data })),
        Payload::Pod => Err(AgentError::internal(&format!(
            "{} has no writable payload",
            handle
        ))),
    }
}

#[async_trait]
impl Cluster for K8sClient {
    #[instrument(skip(self))]
    async fn list_agents(&self) -> AgentResult<Vec<AgentRecord>> {
        let list = self.agents().list(&ListParams::default()).await?;
        Ok(list.items.into_iter().map(agent_record).collect())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        kind: ResourceKind,
        field_selector: &str,
    ) -> AgentResult<Vec<ResourceHandle>> {
        let lp = list_params(field_selector);

        let handles: Vec<ResourceHandle> = match kind {
            ResourceKind::Pod => {
                let api: Api<Pod> = Api::all(self.client.clone());
                api.list(&lp).await?.items.into_iter().filter_map(pod_handle).collect()
            }
            ResourceKind::Deployment => {
                let api: Api<Deployment> = Api::all(self.client.clone());
                api.list(&lp)
                    .await?
                    .items
                    .into_iter()
                    .filter_map(deployment_handle)
                    .collect()
            }
            ResourceKind::ConfigMap => {
                let api: Api<ConfigMap> = Api::all(self.client.clone());
                api.list(&lp)
                    .await?
                    .items
                    .into_iter()
                    .filter_map(config_map_handle)
                    .collect()
            }
        };

        Ok(handles)
    }

    #[instrument(skip(self, handle), fields(kind = %handle.kind(), namespace = %handle.namespace, name = %handle.name))]
    async fn delete(&self, handle: &ResourceHandle) -> AgentResult<()> {
        let dp = DeleteParams::default();
        match handle.kind() {
            ResourceKind::Pod => {
                let api: Api<Pod> = Api::namespaced(self.client.clone(), &handle.namespace);
                api.delete(&handle.name, &dp).await?;
            }
            ResourceKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), &handle.namespace);
                api.delete(&handle.name, &dp).await?;
            }
            ResourceKind::ConfigMap => {
                let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &handle.namespace);
                api.delete(&handle.name, &dp).await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self, handle), fields(kind = %handle.kind(), namespace = %handle.namespace, name = %handle.name))]
    async fn update(&self, handle: &ResourceHandle) -> AgentResult<()> {
        let patch = update_patch(handle)?;
        let pp = PatchParams::default();
        match handle.kind() {
            ResourceKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), &handle.namespace);
                api.patch(&handle.name, &pp, &Patch::Merge(&patch)).await?;
            }
            ResourceKind::ConfigMap => {
                let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &handle.namespace);
                api.patch(&handle.name, &pp, &Patch::Merge(&patch)).await?;
            }
            // update_patch already rejected pods
            ResourceKind::Pod => {}
        }
        Ok(())
    }
}
