//! Configuration loading.
//!
//! Object settings and driver settings are read from a single
//! `stage-kit.toml` file (see [`sk_protocol::StageConfig`]).

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, parse_config, DEFAULT_CONFIG_FILE};
