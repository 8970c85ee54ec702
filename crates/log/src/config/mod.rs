//! Logger configuration.

mod presets;

use serde::{Deserialize, Serialize};

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line, human friendly.
    Pretty,
    /// Single line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl Format {
    /// Parse a format name, falling back to [`Format::Compact`].
    #[must_use]
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Where formatted output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Writer {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// What each formatted line shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// ANSI colours.
    pub colors: bool,
    /// Timestamps.
    pub time: bool,
    /// Source file and line.
    pub source: bool,
    /// Event target (module path).
    pub target: bool,
    /// Flatten event fields into the top-level JSON object.
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            time: true,
            source: false,
            target: true,
            flatten: false,
        }
    }
}

impl DisplayConfig {
    /// Apply `FLOWSCOPE_LOG_COLORS`, `FLOWSCOPE_LOG_TIME` and
    /// `FLOWSCOPE_LOG_SOURCE` overrides.
    pub fn parse_env(&mut self) {
        let flag = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        };
        if let Some(colors) = flag("FLOWSCOPE_LOG_COLORS") {
            self.colors = colors;
        }
        if let Some(time) = flag("FLOWSCOPE_LOG_TIME") {
            self.time = time;
        }
        if let Some(source) = flag("FLOWSCOPE_LOG_SOURCE") {
            self.source = source;
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `EnvFilter` directive, e.g. `info` or `flowscope_debug=trace,info`.
    pub level: String,
    /// Output format.
    pub format: Format,
    /// Output destination.
    pub writer: Writer,
    /// Display options.
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: Format::default(),
            writer: Writer::default(),
            display: DisplayConfig::default(),
        }
    }
}
