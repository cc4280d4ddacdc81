//! Error types for the chaos agent

use thiserror::Error;

/// Errors the agent can run into while talking to the cluster or reading its configuration
#[derive(Error, Debug)]
pub enum AgentError {
    /// No ChaosAgent object exists in the cluster
    #[error("no ChaosAgent found in the cluster")]
    NotFound,

    /// More than one ChaosAgent object exists; the agent refuses to pick one
    #[error("expected exactly one ChaosAgent, found {}: {}", .0.len(), .0.join(", "))]
    AmbiguousConfig(Vec<String>),

    /// The ChaosAgent spec is missing fields or holds out-of-range values
    #[error("invalid ChaosAgent spec: {0}")]
    InvalidConfig(String),

    /// Kubernetes API call failed
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn invalid_config(msg: &str) -> Self {
        AgentError::InvalidConfig(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        AgentError::Internal(msg.to_string())
    }
}

/// Result alias used across the library
pub type AgentResult<T> = Result<T, AgentError>;
