//! # sk-protocol
//!
//! Core data models for stage-kit.
//!
//! This crate defines all shared data structures used for:
//! - Lifecycle conditions
//! - Object and driver configuration (TOML)
//! - Lifecycle events published to hosts
//!
//! ## Modules
//!
//! - [`lifecycle_models`]: The condition every lifecycle object moves through
//! - [`config_models`]: Log levels, object settings, driver and file configuration
//! - [`events`]: Events published while objects and machines run
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and uuid
//! - Independent compilation: No dependencies on other stage-kit crates

pub mod config_models;
pub mod events;
pub mod lifecycle_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use events::*;
pub use lifecycle_models::*;
