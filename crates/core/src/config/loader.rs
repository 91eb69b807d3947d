//! Loader for the `stage-kit.toml` configuration file.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use sk_protocol::StageConfig;
use std::path::Path;

/// File name looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "stage-kit.toml";

/// Loads the stage configuration from `path`.
///
/// A missing file is not an error: the default configuration is returned.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has fields of the wrong type
/// - The driver frame period is zero
///
/// # Example
///
/// ```rust,no_run
/// use sk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("stage-kit.toml"))?;
/// println!("Frame period: {} ms", config.driver.frame_ms);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: &Path) -> ConfigResult<StageConfig> {
    if !path.exists() {
        return Ok(StageConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(&content, path)
}

/// Parses and validates configuration text. `path` is only used in errors.
pub fn parse_config(content: &str, path: &Path) -> ConfigResult<StageConfig> {
    let config: StageConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    if config.driver.frame_ms == 0 {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "driver.frame_ms must be greater than zero".to_string(),
        });
    }

    Ok(config)
}
