//! Blackadder chaos agent library
//!
//! This library contains the components of the in-cluster chaos agent.

pub mod chaos;
pub mod config;
pub mod error;
pub mod k8s;
