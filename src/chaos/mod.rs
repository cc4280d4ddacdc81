//! Chaos engineering core
//!
//! Discovers the ChaosAgent configuration, inventories workload resources
//! outside the excluded namespaces and randomly perturbs them:
//! - Pod termination, bounded by a tolerance
//! - Deployment scale-up, capped at 128 replicas
//! - ConfigMap data corruption, never touching immutable maps

mod agent;
mod controller;
pub mod inventory;
mod placeholder;
pub mod policies;
mod types;

pub use agent::{fetch_config, parse_spec, MAX_EAGERNESS};
pub use controller::{ChaosController, PolicySet};
pub use placeholder::{sentence, Lorem, TextSource};
pub use types::*;
