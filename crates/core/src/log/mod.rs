//! Logger facade.
//!
//! Every lifecycle object owns a [`Logger`] bound to its filter level and
//! name tag. Messages are forwarded to the `tracing` crate; installing a
//! subscriber is left to the host.

mod logger;

pub use logger::{tracing_level, Logger};
