//! upgradeps - upgrade package.json dependencies to their latest versions
//!
//! This library provides the core functionality:
//! - Reading and rewriting package.json without disturbing its layout
//! - Querying the npm registry for latest and same-major versions
//! - Classifying each change (major, minor, patch, prerelease forms)
//! - Optionally resynchronizing node_modules via the detected package manager

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod package_manager;
pub mod registry;
pub mod update;
