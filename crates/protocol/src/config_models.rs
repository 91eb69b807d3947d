//! Configuration models for lifecycle objects and the frame driver.
//!
//! These structures can be built in code or deserialized from a
//! `stage-kit.toml` file (see `StageConfig`).

use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered from the most verbose to the most severe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Variable dumps and condition changes.
    Trace,
    /// Branching information.
    Debug,
    /// General messages.
    #[default]
    Info,
    /// Something is off but the object keeps working.
    Warning,
    /// Something is off and the object cannot work.
    Error,
    /// Crash-grade failure.
    Critical,
}

impl LogLevel {
    /// Stable label used as the `[Level]` message prefix.
    pub const fn label(self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" | "fatal" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Settings shared by every lifecycle object.
///
/// Fixed at construction; subtypes wrap this in their own setting struct.
///
/// # Example
///
/// ```toml
/// filter_level = "debug"
/// name_tag = "battle"
/// self_tick = true
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Messages below this level are dropped.
    pub filter_level: LogLevel,

    /// Tag attached to every log line. Empty means "use the type name".
    pub name_tag: String,

    /// Whether the object spawns its own per-frame update loop.
    pub self_tick: bool,
}

impl Settings {
    /// Set the log filter level.
    pub fn with_filter_level(mut self, level: LogLevel) -> Self {
        self.filter_level = level;
        self
    }

    /// Set the name tag.
    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_tag = tag.into();
        self
    }

    /// Enable or disable the self-driven update loop.
    pub fn with_self_tick(mut self, self_tick: bool) -> Self {
        self.self_tick = self_tick;
        self
    }
}

/// Settings for the host frame driver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    /// Frame period in milliseconds.
    pub frame_ms: u64,

    /// Optional cap on the number of frames driven before giving up.
    pub max_frames: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            max_frames: None,
        }
    }
}

/// Represents the whole `stage-kit.toml` file.
///
/// # Example
///
/// ```toml
/// [defaults]
/// filter_level = "info"
///
/// [driver]
/// frame_ms = 16
///
/// [objects.battle]
/// filter_level = "trace"
/// self_tick = true
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StageConfig {
    /// Settings applied to objects without an explicit entry.
    pub defaults: Settings,

    /// Host driver settings.
    pub driver: DriverConfig,

    /// Per-object overrides, keyed by object name.
    pub objects: HashMap<String, Settings>,
}

impl StageConfig {
    /// Resolve the settings for a named object.
    ///
    /// Falls back to `defaults`; an empty name tag is replaced by `name`.
    pub fn settings_for(&self, name: &str) -> Settings {
        let mut settings = self
            .objects
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone());
        if settings.name_tag.is_empty() {
            settings.name_tag = name.to_string();
        }
        settings
    }
}
