//! Service Configuration
//!
//! Loaded once at startup and treated as read-only input afterwards.
//! Sources are merged with `config`: crate defaults, then an optional TOML
//! file, then a `JEXUPDATE_`-prefixed environment overlay (highest).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Identity of this update server, reported in the catalog index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name, emitted as the `name` attribute of the extension set.
    pub name: String,

    /// Server description, emitted alongside the name.
    pub description: String,

    /// Public base URI of this service. Details URLs in the catalog index
    /// are built by rewriting this URI's path to `<identifier>.xml`.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "JEX Update Server".to_string(),
            description: "Joomla! extension update server".to_string(),
            base_url: "http://localhost:8080/".to_string(),
        }
    }
}

/// On-disk cache for rendered update documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the rendered XML files.
    pub dir: PathBuf,

    /// Seconds a rendered document stays fresh after its last write.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache"),
            ttl_seconds: 86_400,
        }
    }
}

/// Source-hosting API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the hosting API.
    pub api_base: String,

    /// Optional bearer token for authenticated requests.
    pub token: Option<String>,

    /// Request timeout. The hosting API gets no retry budget; one slow or
    /// failed call surfaces as a skipped entry or an upstream error.
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            timeout_seconds: 30,
        }
    }
}

/// Knobs for the rendered update documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Value of the `format` attribute on `<downloadurl>` entries. The
    /// upstream installer assets are zip archives for every known catalog.
    pub package_format: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            package_format: "zip".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration for the update server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JexConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub remote: RemoteConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,

    /// The extension catalog: identifier -> owning vendor namespace.
    /// Immutable for the lifetime of the process; iterated in key order so
    /// rendered indexes are deterministic.
    pub repositories: BTreeMap<String, String>,
}

impl JexConfig {
    /// Load configuration from the given file (or `jexupdate.toml` in the
    /// working directory when absent) with the environment overlay applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder();
        let builder = match path {
            Some(p) => builder.add_source(File::from(p)),
            None => builder.add_source(File::with_name("jexupdate").required(false)),
        };
        let builder = builder.add_source(
            Environment::with_prefix("JEXUPDATE")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
