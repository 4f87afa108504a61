//! Log configuration shared with the embedding build driver.
//!
//! The core itself only emits `tracing` events; the driver decides how they
//! are rendered. This module parses the user/environment configuration
//! (`KILN_LOG_FORMAT`, `KILN_LOG_LEVEL`) into a value the driver can hand
//! to its subscriber.

use std::env;
use std::fmt;

/// Output format for compiler log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        };
        f.write_str(text)
    }
}

/// Logging verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" | "verbose" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(text)
    }
}

/// Resolved log configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    pub const DEFAULT: Self = Self {
        format: LogFormat::Text,
        level: LogLevel::Info,
    };

    /// Defaults overridden by `KILN_LOG_FORMAT` / `KILN_LOG_LEVEL`.
    #[must_use]
    pub fn from_env() -> Self {
        let format = env::var_os("KILN_LOG_FORMAT").map(|value| value.to_string_lossy().to_string());
        let level = env::var_os("KILN_LOG_LEVEL").map(|value| value.to_string_lossy().to_string());
        Self::DEFAULT.with_overrides(format.as_deref(), level.as_deref())
    }

    fn with_overrides(mut self, format: Option<&str>, level: Option<&str>) -> Self {
        if let Some(spec) = format.and_then(LogFormat::parse) {
            self.format = spec;
        }
        if let Some(spec) = level.and_then(LogLevel::parse) {
            self.level = spec;
        }
        self
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
