//! Upgrade resolution logic for dependencies
//!
//! This module provides:
//! - Upgrade policy merged from CLI flags and the configuration file
//! - Resolution engine that queries the registry and classifies changes

mod engine;
mod policy;

pub use engine::{select_minor_target, ResolutionEngine};
pub use policy::UpgradePolicy;
