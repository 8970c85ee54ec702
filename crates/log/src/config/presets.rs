//! Ready-made configurations.

use super::{Config, DisplayConfig, Format};

impl Config {
    /// Defaults overridden by `FLOWSCOPE_LOG` (or `RUST_LOG`),
    /// `FLOWSCOPE_LOG_FORMAT` and the display variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // FLOWSCOPE_LOG wins over RUST_LOG
        if let Ok(level) = std::env::var("FLOWSCOPE_LOG") {
            config.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }

        if let Ok(format) = std::env::var("FLOWSCOPE_LOG_FORMAT") {
            config.format = Format::parse_lossy(&format);
        }

        config.display.parse_env();
        config
    }

    /// Pretty output at `debug` with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_owned(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Flattened JSON at `info`, no colours.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_owned(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("pretty", Format::Pretty)]
    #[case("JSON", Format::Json)]
    #[case(" compact ", Format::Compact)]
    #[case("logfmt", Format::Compact)]
    fn format_names_parse(#[case] name: &str, #[case] expected: Format) {
        assert_eq!(Format::parse_lossy(name), expected);
    }

    #[test]
    fn production_is_json_without_colors() {
        let config = Config::production();
        assert_eq!(config.format, Format::Json);
        assert!(!config.display.colors);
        assert!(config.display.flatten);
    }

    #[test]
    fn development_is_verbose() {
        let config = Config::development();
        assert_eq!(config.level, "debug");
        assert!(config.display.source);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.display, DisplayConfig::default());
    }
}
