use sk_protocol::LogLevel;
use std::fmt;

/// Leveled, tagged logger used by lifecycle objects.
///
/// Messages below the filter level are dropped. The name tag is attached
/// as the `object` field of the emitted `tracing` event; the level label is
/// optionally prefixed to the message text.
#[derive(Debug, Clone)]
pub struct Logger {
    filter: LogLevel,
    tag: String,
    add_level_tag: bool,
}

impl Logger {
    /// Create a logger with the given filter and name tag.
    pub fn new(filter: LogLevel, tag: impl Into<String>) -> Self {
        Self {
            filter,
            tag: tag.into(),
            add_level_tag: true,
        }
    }

    /// Enable or disable the `[Level]` prefix.
    pub fn with_level_tag(mut self, enabled: bool) -> Self {
        self.add_level_tag = enabled;
        self
    }

    pub fn filter(&self) -> LogLevel {
        self.filter
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether a message at `level` passes the filter.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.filter
    }

    /// Format a message the way it will be emitted, or `None` if filtered out.
    pub fn render(&self, level: LogLevel, message: impl fmt::Display) -> Option<String> {
        if !self.enabled(level) {
            return None;
        }
        if self.add_level_tag {
            Some(format!("[{level}] {message}"))
        } else {
            Some(message.to_string())
        }
    }

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        let Some(line) = self.render(level, message) else {
            return;
        };
        match level {
            LogLevel::Trace => tracing::trace!(object = %self.tag, "{line}"),
            LogLevel::Debug => tracing::debug!(object = %self.tag, "{line}"),
            LogLevel::Info => tracing::info!(object = %self.tag, "{line}"),
            LogLevel::Warning => tracing::warn!(object = %self.tag, "{line}"),
            LogLevel::Error | LogLevel::Critical => tracing::error!(object = %self.tag, "{line}"),
        }
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn critical(&self, message: impl fmt::Display) {
        self.log(LogLevel::Critical, message);
    }
}

/// Map a [`LogLevel`] onto the `tracing` level it is emitted at.
pub fn tracing_level(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Trace => tracing::Level::TRACE,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warning => tracing::Level::WARN,
        LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_drops_lower_levels() {
        let logger = Logger::new(LogLevel::Warning, "battle");

        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Warning));
        assert!(logger.enabled(LogLevel::Critical));
        assert_eq!(logger.render(LogLevel::Debug, "hidden"), None);
    }

    #[test]
    fn test_render_prefixes_level() {
        let logger = Logger::new(LogLevel::Trace, "battle");
        assert_eq!(
            logger.render(LogLevel::Error, "boom").as_deref(),
            Some("[Error] boom")
        );

        let plain = logger.with_level_tag(false);
        assert_eq!(plain.render(LogLevel::Info, "hi").as_deref(), Some("hi"));
    }

    #[test]
    fn test_every_level_can_be_emitted() {
        // No subscriber is installed; this only checks nothing panics.
        let logger = Logger::new(LogLevel::Trace, "all");
        logger.trace("trace");
        logger.debug("debug");
        logger.info("info");
        logger.warning("warning");
        logger.error("error");
        logger.critical("critical");
        assert_eq!(logger.tag(), "all");
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(tracing_level(LogLevel::Warning), tracing::Level::WARN);
        assert_eq!(tracing_level(LogLevel::Critical), tracing::Level::ERROR);
    }
}
