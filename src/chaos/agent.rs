//! ChaosAgent discovery
//!
//! Finds the single ChaosAgent object in the cluster and turns its spec into
//! a validated [`AgentConfig`].

use tracing::info;

use super::types::{AgentConfig, AgentRecord};
use crate::error::{AgentError, AgentResult};
use crate::k8s::Cluster;

/// Highest accepted eagerness, in percent
pub const MAX_EAGERNESS: u8 = 100;

/// Fetch the chaos configuration from the cluster.
///
/// Zero or several ChaosAgent objects are both fatal: the caller is expected
/// to stop the process.
pub async fn fetch_config<C>(cluster: &C) -> AgentResult<AgentConfig>
where
    C: Cluster + ?Sized,
{
    let mut agents = cluster.list_agents().await?;

    let record = match agents.len() {
        0 => return Err(AgentError::NotFound),
        1 => agents.remove(0),
        _ => {
            return Err(AgentError::AmbiguousConfig(
                agents.iter().map(AgentRecord::qualified_name).collect(),
            ))
        }
    };

    let config = parse_spec(&record)?;

    info!(
        agent = %record.qualified_name(),
        excluded_namespaces = ?config.excluded_namespaces,
        pause_duration = config.pause_duration,
        tolerance = config.tolerance,
        eagerness = config.eagerness,
        "Successfully retrieved agent configuration"
    );

    Ok(config)
}

/// Parse and validate the spec of one ChaosAgent
pub fn parse_spec(record: &AgentRecord) -> AgentResult<AgentConfig> {
    let config: AgentConfig = serde_json::from_value(record.spec.clone()).map_err(|e| {
        AgentError::invalid_config(&format!("{}: {}", record.qualified_name(), e))
    })?;

    if config.eagerness > MAX_EAGERNESS {
        return Err(AgentError::invalid_config(&format!(
            "{}: eagerness must be between 0 and {}, got {}",
            record.qualified_name(),
            MAX_EAGERNESS,
            config.eagerness
        )));
    }

    Ok(config)
}
