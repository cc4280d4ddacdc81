//! Randomized perturbation policies
//!
//! Each policy draws independently per candidate with probability
//! `eagerness / 100` and issues the resulting delete/update calls one by one.
//! A failed call is logged and never stops the rest of the batch.

use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::placeholder::TextSource;
use super::types::{Payload, ResourceHandle, RoundReport, SkipReason};
use crate::k8s::Cluster;

/// Replica ceiling for the scaling policy
pub const MAX_REPLICAS: i32 = 128;

/// One eagerness draw: true with probability `eagerness / 100`
pub fn roll<R: Rng + ?Sized>(rng: &mut R, eagerness: u8) -> bool {
    rng.gen_range(0..100u8) < eagerness
}

/// Pods selected for termination, one independent draw per pod
pub fn mark_for_termination<'a, R: Rng + ?Sized>(
    pods: &'a [ResourceHandle],
    eagerness: u8,
    rng: &mut R,
) -> Vec<&'a ResourceHandle> {
    pods.iter().filter(|_| roll(rng, eagerness)).collect()
}

/// Replica count after a triggered scale-up: doubled, capped at [`MAX_REPLICAS`],
/// never lower than the current count
pub fn scaled_replicas(current: i32) -> i32 {
    current.saturating_mul(2).min(MAX_REPLICAS).max(current)
}

/// Randomly delete pods while keeping at least `tolerance` of them.
///
/// The tolerance check is all-or-nothing: when the marked set would leave
/// fewer than `tolerance` pods, nothing is deleted this round.
pub async fn terminate_pods<C, R>(
    cluster: &C,
    pods: &[ResourceHandle],
    tolerance: u32,
    eagerness: u8,
    rng: &mut R,
) -> RoundReport
where
    C: Cluster + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = RoundReport::new(pods.len());
    let tolerance = tolerance as usize;

    if pods.len() < tolerance {
        info!(
            pods = pods.len(),
            tolerance, "Not enough pods to respect tolerance, skipping termination"
        );
        report.skipped = Some(SkipReason::BelowTolerance);
        return report;
    }

    let marked = mark_for_termination(pods, eagerness, rng);
    report.selected = marked.len();

    let survivors = pods.len() - marked.len();
    if survivors < tolerance {
        info!(
            pods = pods.len(),
            marked = marked.len(),
            tolerance,
            "Termination batch would breach tolerance, skipping"
        );
        report.skipped = Some(SkipReason::WouldBreachTolerance);
        return report;
    }

    for pod in marked {
        match cluster.delete(pod).await {
            Ok(()) => {
                info!("Killed pod {}/{}", pod.namespace, pod.name);
                report.mutated += 1;
            }
            Err(e) => {
                error!("Error killing pod {}/{}: {}", pod.namespace, pod.name, e);
                report.failed += 1;
            }
        }
    }

    report
}

/// Randomly double deployment replica counts, up to [`MAX_REPLICAS`]
pub async fn scale_deployments<C, R>(
    cluster: &C,
    deployments: &[ResourceHandle],
    eagerness: u8,
    rng: &mut R,
) -> RoundReport
where
    C: Cluster + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = RoundReport::new(deployments.len());

    for deployment in deployments {
        let Some(current) = deployment.replicas() else {
            continue;
        };
        if !roll(rng, eagerness) {
            continue;
        }
        report.selected += 1;

        let replicas = scaled_replicas(current);
        if replicas == current {
            debug!(
                "Deployment {}/{} already at {} replicas, leaving as is",
                deployment.namespace, deployment.name, current
            );
            continue;
        }

        let scaled = ResourceHandle {
            payload: Payload::Deployment { replicas },
            ..deployment.clone()
        };

        match cluster.update(&scaled).await {
            Ok(()) => {
                info!(
                    "Scaled {}/{} from {} to {}",
                    deployment.namespace, deployment.name, current, replicas
                );
                report.mutated += 1;
            }
            Err(e) => {
                error!(
                    "Error scaling deployment {}/{}: {}",
                    deployment.namespace, deployment.name, e
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// Randomly overwrite every value of mutable ConfigMaps with placeholder text
pub async fn corrupt_config_maps<C, R, T>(
    cluster: &C,
    config_maps: &[ResourceHandle],
    eagerness: u8,
    rng: &mut R,
    text: &mut T,
) -> RoundReport
where
    C: Cluster + ?Sized,
    R: Rng + ?Sized,
    T: TextSource + ?Sized,
{
    let mut report = RoundReport::new(config_maps.len());

    for config_map in config_maps {
        let data = match &config_map.payload {
            Payload::ConfigMap {
                immutable: true, ..
            } => {
                debug!(
                    "ConfigMap {}/{} is immutable, skipping",
                    config_map.namespace, config_map.name
                );
                continue;
            }
            Payload::ConfigMap { data, .. } => data,
            _ => continue,
        };
        if !roll(rng, eagerness) {
            continue;
        }
        report.selected += 1;

        let corrupted: BTreeMap<String, String> = data
            .keys()
            .map(|key| (key.clone(), text.next_text()))
            .collect();

        let updated = ResourceHandle {
            payload: Payload::ConfigMap {
                data: corrupted,
                immutable: false,
            },
            ..config_map.clone()
        };

        match cluster.update(&updated).await {
            Ok(()) => {
                info!(
                    "Corrupted {} keys of configmap {}/{}",
                    data.len(),
                    config_map.namespace,
                    config_map.name
                );
                report.mutated += 1;
            }
            Err(e) => {
                error!(
                    "Error corrupting configmap {}/{}: {}",
                    config_map.namespace, config_map.name, e
                );
                report.failed += 1;
            }
        }
    }

    report
}
