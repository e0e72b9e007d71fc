//! Conform Logging
//!
//! Environment-controlled logging for the conform validation engine. The
//! macros check the global level before formatting, so disabled records
//! cost one atomic load.
//!
//! # Usage
//!
//! ```rust
//! use conform_log::{debug, trace, TARGET_ENGINE};
//!
//! let path = "$.list[1]";
//! trace!(target: TARGET_ENGINE, "validating {}", path);
//! debug!("node {} aborted", path);
//! ```
//!
//! # Environment Variables
//!
//! - `CONFORM_DEBUG=1` - Enable debug logging
//! - `CONFORM_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `CONFORM_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `CONFORM_LOG_COLOR=1|0` - Enable/disable colors
//! - `CONFORM_LOG_TIMESTAMPS=1|0` - Prefix records with a timestamp
//! - `CONFORM_LOG_MODULE=1|0` - Include the record target

use chrono::Local;
use once_cell::sync::Lazy;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering::Relaxed};

/// Target used by the rule engine (node lifecycle, aborts).
pub const TARGET_ENGINE: &str = "conform::engine";

/// Target used by conditional schema selection.
pub const TARGET_WHEN: &str = "conform::when";

/// Target used when validating raw JSON payloads.
pub const TARGET_PIPE: &str = "conform::pipe";

const ENV_PREFIX: &str = "CONFORM_";

// ============================================================================
// Levels
// ============================================================================

/// Severity of a record. `Off` disables output entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Per-node lifecycle events
    Trace,
    /// Aborts and conditional selection
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Off,
    ];

    const NAMES: [&'static str; 6] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"];

    /// Parse a level name, case-insensitively. Accepts `warning` and `none`
    /// as aliases.
    pub fn parse(s: &str) -> Option<Self> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("warning") {
            return Some(Level::Warn);
        }
        if name.eq_ignore_ascii_case("none") {
            return Some(Level::Off);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    fn from_u8(raw: u8) -> Self {
        Self::ALL.get(raw as usize).copied().unwrap_or(Level::Off)
    }

    fn initial(self) -> char {
        self.as_str().chars().next().unwrap_or('?')
    }

    #[cfg(feature = "color")]
    fn color(self) -> colored::Color {
        use colored::Color;
        [
            Color::Magenta,
            Color::Blue,
            Color::Green,
            Color::Yellow,
            Color::Red,
            Color::White,
        ][self as usize]
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `2024-01-01 12:00:00.000 DEBUG [target] message`
    Pretty,
    /// `12:00:00 D target: message`
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        [
            ("pretty", Format::Pretty),
            ("compact", Format::Compact),
            ("json", Format::Json),
        ]
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
        .map(|(_, format)| format)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `CONFORM_DEBUG`: raises the level to at least `Debug`
    pub debug: bool,
    /// `CONFORM_LOG_LEVEL`
    pub level: Level,
    /// `CONFORM_LOG_FORMAT`
    pub format: Format,
    /// `CONFORM_LOG_COLOR`; detected from stderr and `NO_COLOR` when unset
    pub color: bool,
    /// `CONFORM_LOG_TIMESTAMPS`
    pub timestamps: bool,
    /// `CONFORM_LOG_MODULE`: print the record target
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Warn,
            format: Format::Pretty,
            color: false,
            timestamps: true,
            show_target: true,
        }
    }
}

impl LogConfig {
    /// Read `CONFORM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build a configuration from `lookup`, which receives keys without the
    /// `CONFORM_` prefix (`DEBUG`, `LOG_LEVEL`, ...). Unset or unparsable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key).map(|raw| {
                let raw = raw.trim();
                raw == "1" || raw.eq_ignore_ascii_case("true")
            })
        };

        let defaults = Self::default();
        let debug = flag("DEBUG").unwrap_or(false);
        let fallback_level = if debug { Level::Debug } else { defaults.level };

        Self {
            debug,
            level: lookup("LOG_LEVEL")
                .and_then(|s| Level::parse(&s))
                .unwrap_or(fallback_level),
            format: lookup("LOG_FORMAT")
                .and_then(|s| Format::parse(&s))
                .unwrap_or(defaults.format),
            color: flag("LOG_COLOR").unwrap_or_else(|| {
                std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
            }),
            timestamps: flag("LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            show_target: flag("LOG_MODULE").unwrap_or(defaults.show_target),
        }
    }
}

/// Mutable switches, seeded from [`LogConfig`] on first use.
struct Runtime {
    debug: AtomicBool,
    level: AtomicU8,
}

static RUNTIME: Runtime = Runtime {
    debug: AtomicBool::new(false),
    level: AtomicU8::new(Level::Warn as u8),
};

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    RUNTIME.debug.store(config.debug, Relaxed);
    RUNTIME.level.store(config.level as u8, Relaxed);
    config
});

/// Read the environment now instead of on the first record.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// Configuration as read from the environment. Runtime overrides made with
/// [`set_level`] or [`set_debug`] are not reflected here.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    RUNTIME.debug.load(Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(RUNTIME.level.load(Relaxed))
}

/// Override the level at runtime.
pub fn set_level(level: Level) {
    init();
    RUNTIME.level.store(level as u8, Relaxed);
}

/// Toggle debug mode. Enabling it lowers the level to `Debug` if needed;
/// disabling it leaves the level alone.
pub fn set_debug(enabled: bool) {
    init();
    RUNTIME.debug.store(enabled, Relaxed);
    if enabled {
        set_level(current_level().min(Level::Debug));
    }
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }

    let line = render(level, target, message, config());
    let _ = writeln!(std::io::stderr().lock(), "{line}");
}

fn render(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    match config.format {
        Format::Pretty => render_pretty(level, target, message, config),
        Format::Compact => render_compact(level, target, message, config),
        #[cfg(feature = "json")]
        Format::Json => render_json(level, target, message),
        // without serde_json, fall back to the compact line
        #[cfg(not(feature = "json"))]
        Format::Json => render_compact(level, target, message, config),
    }
}

fn render_pretty(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let mut parts = Vec::with_capacity(4);
    if config.timestamps {
        parts.push(Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string());
    }
    parts.push(level_label(level, config));
    if config.show_target && !target.is_empty() {
        parts.push(format!("[{target}]"));
    }
    parts.push(message.to_string());
    parts.join(" ")
}

fn render_compact(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let stamp = if config.timestamps {
        Local::now().format("%H:%M:%S ").to_string()
    } else {
        String::new()
    };
    let target = if config.show_target && !target.is_empty() {
        format!("{target}: ")
    } else {
        String::new()
    };
    format!("{stamp}{} {target}{message}", level.initial())
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "target": target,
        "message": message,
    })
    .to_string()
}

#[cfg(feature = "color")]
fn level_label(level: Level, config: &LogConfig) -> String {
    use colored::Colorize;
    if config.color {
        format!("{:5}", level.as_str().color(level.color()))
    } else {
        format!("{level:5}")
    }
}

#[cfg(not(feature = "color"))]
fn level_label(level: Level, _config: &LogConfig) -> String {
    format!("{level:5}")
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {{
        let level = $level;
        if $crate::is_level_enabled(level) {
            $crate::log(level, $target, &format!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), $($arg)+)
    };
}

/// Log a trace record. The message is only formatted when trace is enabled.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug record.
///
/// Enabled by `CONFORM_DEBUG=1` or `CONFORM_LOG_LEVEL=debug`.
///
/// ```rust
/// use conform_log::debug;
///
/// let path = "$.length";
/// debug!(target: "conform::engine", "aborted at {}", path);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber driven by the `CONFORM_*` configuration, for
    //! applications that already collect spans.

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, fmt};

    /// Filtered by `RUST_LOG` when set, otherwise by `CONFORM_LOG_LEVEL`.
    pub fn subscriber() -> impl tracing::Subscriber + Send + Sync {
        let config = super::config();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

        tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_ansi(config.color)
                .with_target(config.show_target)
                .with_writer(std::io::stderr),
        )
    }
}
