//! ciboard logging
//!
//! The library crates emit `tracing` events. This crate reads the `CIBOARD_*`
//! environment switches into a [`LogConfig`] and installs the matching
//! `tracing` subscriber, writing to stderr.
//!
//! # Usage
//!
//! ```rust
//! use ciboard_log::{Level, LogConfig};
//!
//! let config = LogConfig::from_env().with_level(Level::Debug);
//! ciboard_log::init_with(&config);
//! tracing::debug!(push_id = 526443, "Resolving decision task");
//! ```
//!
//! # Environment Variables
//!
//! - `CIBOARD_DEBUG=1` - Enable debug logging
//! - `CIBOARD_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `CIBOARD_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `CIBOARD_LOG_COLOR=1|0` - Enable/disable colors
//! - `CIBOARD_LOG_TIMESTAMPS=1|0` - Include timestamps
//!
//! `RUST_LOG`, when set, replaces the level with a full filter directive.

use std::env;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as layer};

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of events that are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Nothing is written.
    Off,
}

impl Level {
    /// Lowercase directive understood by [`EnvFilter`].
    pub fn as_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_directive().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-field human readable lines
    Pretty,
    /// Compact single-line format
    Compact,
    /// One JSON object per line; compact without the `json` feature
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: Format,
    /// ANSI colors in pretty and compact output.
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Pretty,
            color: false,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Read the `CIBOARD_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the `CIBOARD_*` variables through `lookup`. Unparseable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        let debug = flag("CIBOARD_DEBUG").unwrap_or(false);
        let level = lookup("CIBOARD_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });
        let format = lookup("CIBOARD_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Pretty);
        let color = flag("CIBOARD_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());
        let timestamps = flag("CIBOARD_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            level,
            format,
            color,
            timestamps,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Lower the level to at least debug.
    pub fn verbose(self) -> Self {
        let level = self.level.min(Level::Debug);
        self.with_level(level)
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

// ============================================================================
// Subscriber
// ============================================================================

/// Install the subscriber described by the environment.
pub fn init() -> bool {
    init_with(&LogConfig::from_env())
}

/// Install the global subscriber for `config`. Returns `false` if one was
/// already set.
pub fn init_with(config: &LogConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.filter());
    let base = layer::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.color);

    let result = match (config.format, config.timestamps) {
        #[cfg(feature = "json")]
        (Format::Json, _) => registry
            .with(layer::layer().json().with_writer(std::io::stderr))
            .try_init(),
        #[cfg(not(feature = "json"))]
        (Format::Json, _) => registry.with(base.compact()).try_init(),
        (Format::Compact, true) => registry.with(base.compact()).try_init(),
        (Format::Compact, false) => registry.with(base.compact().without_time()).try_init(),
        (Format::Pretty, true) => registry.with(base).try_init(),
        (Format::Pretty, false) => registry.with(base.without_time()).try_init(),
    };

    result.is_ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" off ".parse::<Level>(), Ok(Level::Off));
        assert!("verbose".parse::<Level>().is_err());
        assert_eq!(Level::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("Compact".parse::<Format>(), Ok(Format::Compact));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Pretty);
        assert!(!config.color);
        assert!(config.timestamps);
    }

    #[test]
    fn test_variables_are_read() {
        let config = LogConfig::from_lookup(lookup(&[
            ("CIBOARD_LOG_LEVEL", "warn"),
            ("CIBOARD_LOG_FORMAT", "json"),
            ("CIBOARD_LOG_COLOR", "true"),
            ("CIBOARD_LOG_TIMESTAMPS", "0"),
        ]));
        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Json);
        assert!(config.color);
        assert!(!config.timestamps);
    }

    #[test]
    fn test_debug_flag_and_explicit_level() {
        let debug = LogConfig::from_lookup(lookup(&[("CIBOARD_DEBUG", "1")]));
        assert_eq!(debug.level, Level::Debug);

        let explicit =
            LogConfig::from_lookup(lookup(&[("CIBOARD_DEBUG", "1"), ("CIBOARD_LOG_LEVEL", "error")]));
        assert_eq!(explicit.level, Level::Error);

        let garbage = LogConfig::from_lookup(lookup(&[("CIBOARD_LOG_LEVEL", "loud")]));
        assert_eq!(garbage.level, Level::Info);
    }

    #[test]
    fn test_no_color_and_term() {
        let tty = LogConfig::from_lookup(lookup(&[("TERM", "xterm")]));
        assert!(tty.color);
        let no_color = LogConfig::from_lookup(lookup(&[("TERM", "xterm"), ("NO_COLOR", "1")]));
        assert!(!no_color.color);
    }

    #[test]
    fn test_verbose_only_lowers() {
        assert_eq!(LogConfig::default().verbose().level, Level::Debug);
        assert_eq!(
            LogConfig::default().with_level(Level::Trace).verbose().level,
            Level::Trace
        );
    }

    #[test]
    fn test_second_init_is_refused() {
        let config = LogConfig::default().with_level(Level::Off);
        init_with(&config);
        assert!(!init_with(&config));
    }
}
