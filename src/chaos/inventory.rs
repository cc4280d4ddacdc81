//! Resource inventory with namespace exclusion

use std::collections::BTreeSet;
use tracing::{debug, error};

use super::types::{ResourceHandle, ResourceKind};
use crate::k8s::Cluster;

/// Field selector excluding every namespace in `excluded`.
///
/// Terms are ANDed by the API server; an empty set yields an empty selector.
pub fn exclusion_selector(excluded: &BTreeSet<String>) -> String {
    excluded
        .iter()
        .map(|ns| format!("metadata.namespace!={}", ns))
        .collect::<Vec<_>>()
        .join(",")
}

/// List resources of `kind` outside the excluded namespaces.
///
/// Listing failures are logged and reported as an empty inventory so the
/// iteration can go on with the other kinds.
pub async fn list<C>(
    cluster: &C,
    kind: ResourceKind,
    excluded: &BTreeSet<String>,
) -> Vec<ResourceHandle>
where
    C: Cluster + ?Sized,
{
    let selector = exclusion_selector(excluded);

    match cluster.list(kind, &selector).await {
        Ok(mut handles) => {
            // the server filter is not trusted for the exclusion guarantee
            handles.retain(|h| !excluded.contains(&h.namespace));
            debug!(%kind, count = handles.len(), "Listed objects");
            handles
        }
        Err(e) => {
            error!(%kind, error = %e, "Error listing objects");
            Vec::new()
        }
    }
}
