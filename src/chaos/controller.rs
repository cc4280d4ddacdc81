//! Chaos control loop
//!
//! Each iteration refreshes the inventories and hands them to the policies,
//! then waits `pauseDuration` seconds. The wait races a cancellation token so
//! the loop stops promptly on shutdown; nothing else ends it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, Span};

use super::inventory;
use super::placeholder::{Lorem, TextSource};
use super::policies;
use super::types::{AgentConfig, IterationReport, ResourceKind};
use crate::k8s::Cluster;

/// Which policies run in each iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySet {
    pub terminate_pods: bool,
    pub scale_deployments: bool,
    pub corrupt_config_maps: bool,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            terminate_pods: true,
            scale_deployments: true,
            corrupt_config_maps: false,
        }
    }
}

/// Owns the chaos configuration and runs the perturbation loop against a cluster
pub struct ChaosController<C: ?Sized> {
    cluster: Arc<C>,
    config: AgentConfig,
    policies: PolicySet,
    rng: StdRng,
    text: Box<dyn TextSource + Send>,
    iteration: u64,
}

impl<C> ChaosController<C>
where
    C: Cluster + ?Sized,
{
    pub fn new(cluster: Arc<C>, config: AgentConfig) -> Self {
        Self {
            cluster,
            config,
            policies: PolicySet::default(),
            rng: StdRng::from_entropy(),
            text: Box::new(Lorem::new(StdRng::from_entropy())),
            iteration: 0,
        }
    }

    pub fn with_policies(mut self, policies: PolicySet) -> Self {
        self.policies = policies;
        self
    }

    /// Replace the entropy-seeded RNGs with seeded ones
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.text = Box::new(Lorem::new(StdRng::seed_from_u64(seed.wrapping_add(1))));
        self
    }

    pub fn with_text_source(mut self, text: Box<dyn TextSource + Send>) -> Self {
        self.text = text;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn pause(&self) -> Duration {
        Duration::from_secs(self.config.pause_duration)
    }

    /// Run one iteration: list, then apply every enabled policy
    #[instrument(skip_all, fields(iteration))]
    pub async fn run_iteration(&mut self) -> IterationReport {
        self.iteration += 1;
        Span::current().record("iteration", self.iteration);
        let mut report = IterationReport::new(self.iteration);
        let cluster = self.cluster.as_ref();
        let excluded = &self.config.excluded_namespaces;

        let pods = if self.policies.terminate_pods {
            inventory::list(cluster, ResourceKind::Pod, excluded).await
        } else {
            Vec::new()
        };
        let deployments = if self.policies.scale_deployments {
            inventory::list(cluster, ResourceKind::Deployment, excluded).await
        } else {
            Vec::new()
        };
        let config_maps = if self.policies.corrupt_config_maps {
            inventory::list(cluster, ResourceKind::ConfigMap, excluded).await
        } else {
            Vec::new()
        };

        if !pods.is_empty() {
            report.terminations = Some(
                policies::terminate_pods(
                    cluster,
                    &pods,
                    self.config.tolerance,
                    self.config.eagerness,
                    &mut self.rng,
                )
                .await,
            );
        }

        if !deployments.is_empty() {
            report.scaling = Some(
                policies::scale_deployments(
                    cluster,
                    &deployments,
                    self.config.eagerness,
                    &mut self.rng,
                )
                .await,
            );
        }

        if !config_maps.is_empty() {
            report.corruption = Some(
                policies::corrupt_config_maps(
                    cluster,
                    &config_maps,
                    self.config.eagerness,
                    &mut self.rng,
                    self.text.as_mut(),
                )
                .await,
            );
        }

        info!(
            pods = pods.len(),
            deployments = deployments.len(),
            config_maps = config_maps.len(),
            mutations = report.total_mutations(),
            "Iteration finished"
        );

        report
    }

    /// Run iterations until `shutdown` is cancelled
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            pause_secs = self.config.pause_duration,
            policies = ?self.policies,
            "Starting chaos loop"
        );

        while !shutdown.is_cancelled() {
            self.run_iteration().await;

            tokio::select! {
                _ = tokio::time::sleep(self.pause()) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        info!(iterations = self.iteration, "Chaos loop stopped");
    }
}
