//! Installing the global subscriber.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format, Writer};
use crate::error::{LogError, LogResult};
use crate::handler::HandlerRegistry;
use crate::layer::HandlerLayer;

/// Assembles and installs the process-wide subscriber.
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
    handlers: HandlerRegistry,
}

/// Guard returned by [`LoggerBuilder::build`].
///
/// Holds the handler registry the installed subscriber dispatches to.
#[derive(Debug, Clone)]
pub struct LoggerGuard {
    handlers: HandlerRegistry,
}

impl LoggerGuard {
    /// Registry of handlers fed by the installed subscriber.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}

/// Build the fmt layer for one of the tracing-subscriber format kinds.
macro_rules! create_fmt_layer {
    ($kind:ident, $display:expr, $writer:expr) => {
        tracing_subscriber::fmt::layer()
            .$kind()
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_writer($writer)
    };
}

/// Install `Registry + filter + fmt + handlers`, with or without timestamps.
macro_rules! init_subscriber {
    ($filter:expr, $fmt_layer:expr, $display:expr, $handlers:expr) => {{
        let handler_layer = HandlerLayer::new($handlers.clone());
        if $display.time {
            Registry::default()
                .with($filter)
                .with($fmt_layer)
                .with(handler_layer)
                .try_init()
        } else {
            Registry::default()
                .with($filter)
                .with($fmt_layer.without_time())
                .with(handler_layer)
                .try_init()
        }
    }};
}

impl LoggerBuilder {
    /// Start from `config` with an empty handler registry.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            handlers: HandlerRegistry::new(),
        }
    }

    /// Dispatch to an existing registry instead of a fresh one.
    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Build and install the global subscriber.
    ///
    /// # Errors
    ///
    /// Fails when `level` is not a valid filter directive or another
    /// global subscriber got there first.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))?;

        let writer = match self.config.writer {
            Writer::Stderr => BoxMakeWriter::new(std::io::stderr),
            Writer::Stdout => BoxMakeWriter::new(std::io::stdout),
        };
        let display = &self.config.display;

        let installed = match self.config.format {
            Format::Pretty => {
                let fmt_layer = create_fmt_layer!(pretty, display, writer);
                init_subscriber!(filter, fmt_layer, display, self.handlers)
            }
            Format::Compact => {
                let fmt_layer = create_fmt_layer!(compact, display, writer);
                init_subscriber!(filter, fmt_layer, display, self.handlers)
            }
            Format::Json => {
                let fmt_layer =
                    create_fmt_layer!(json, display, writer).flatten_event(display.flatten);
                init_subscriber!(filter, fmt_layer, display, self.handlers)
            }
        };
        installed.map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        Ok(LoggerGuard {
            handlers: self.handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_rejected() {
        let config = Config {
            level: "flowscope=loud".to_owned(),
            ..Config::default()
        };
        let err = LoggerBuilder::from_config(config).build().unwrap_err();
        assert!(matches!(err, LogError::Filter(_)));
    }
}
