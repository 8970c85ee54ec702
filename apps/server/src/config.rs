//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, the TOML file,
//! `FLOWSCOPE_*` environment variables (`__` separates nesting levels,
//! e.g. `FLOWSCOPE_HTTP__PORT`), then command-line flags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use flowscope_debug::{DebugNodeConfig, DebugSettings};
use serde::{Deserialize, Serialize};

use crate::cli::ServeArgs;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "flowscope.toml";

/// Everything the server needs to start.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Encoder settings shared by every node.
    pub debug: DebugSettings,
    /// HTTP listener.
    pub http: HttpConfig,
    /// Viewer asset directory; the viewer route is off without it.
    pub viewer_dir: Option<PathBuf>,
    /// Control endpoint authorization.
    pub auth: AuthConfig,
    /// Logging.
    pub log: flowscope_log::Config,
    /// Debug nodes to start.
    pub nodes: Vec<DebugNodeConfig>,
}

/// HTTP listener address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 1880,
        }
    }
}

impl HttpConfig {
    /// `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bearer tokens and the permissions each grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false every request is allowed.
    pub enabled: bool,
    /// Token to permission names, e.g. `debug.write` or `*`.
    pub tokens: HashMap<String, Vec<String>>,
}

/// Flags that override file and environment settings.
#[derive(Debug, Default, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    viewer_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "HttpOverrides::is_empty")]
    http: HttpOverrides,
}

#[derive(Debug, Default, Serialize)]
struct HttpOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

impl HttpOverrides {
    fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none()
    }
}

impl ServerConfig {
    /// Assemble the layered figment for `args`.
    pub fn figment(args: &ServeArgs) -> Figment {
        let file: &Path = args
            .config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let overrides = Overrides {
            viewer_dir: args.viewer_dir.clone(),
            http: HttpOverrides {
                host: args.host.clone(),
                port: args.port,
            },
        };
        // Struct defaults come from `#[serde(default)]`; only the logger is
        // seeded, from `FLOWSCOPE_LOG` / `RUST_LOG`.
        Figment::from(Serialized::default("log", flowscope_log::Config::from_env()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("FLOWSCOPE_").split("__").ignore(&["config", "log"]))
            .merge(Serialized::defaults(overrides))
    }

    /// Load the configuration for `args`.
    pub fn load(args: &ServeArgs) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }
}
