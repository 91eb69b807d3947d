//! Common test utilities for the lifecycle integration tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Journaling hooks and scripted states (fixtures)
//! - Event and journal assertions
//! - Frame driving helpers

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
