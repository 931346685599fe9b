//! Command-line interface for the update server.
//!
//! Drives the same handler path an HTTP request would take, so `render`
//! and `warm` exercise the cache and feed pipeline end to end.

use crate::cache::{Clock, SystemClock};
use crate::config::JexConfig;
use crate::error::JexError;
use crate::remote::{GithubClient, RemoteSource};
use crate::server::{UpdateHandler, INDEX_TARGET};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// JEXUpdate - update server for Joomla! extensions
#[derive(Parser)]
#[command(name = "jexupdate")]
#[command(about = "Update server for Joomla! extensions backed by GitHub releases")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: jexupdate.toml in the working
    /// directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one update document and print it
    Render {
        /// Extension identifier, or "index" for the catalog (default)
        target: Option<String>,

        /// Discard the cached document first
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// Render the index and every configured extension into the cache
    Warm,
    /// Report the catalog and per-target cache freshness
    Check {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Execution context shared by all commands.
pub struct CliContext {
    config: JexConfig,
    handler: UpdateHandler,
}

impl CliContext {
    /// Build a context talking to the real hosting API.
    pub fn new(config: JexConfig) -> Result<Self, JexError> {
        let remote = Arc::new(GithubClient::new(&config.remote)?);
        Self::with_remote(config, remote, Arc::new(SystemClock))
    }

    /// Build a context with injected collaborators.
    pub fn with_remote(
        config: JexConfig,
        remote: Arc<dyn RemoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JexError> {
        let handler = UpdateHandler::new(&config, remote, clock)?;
        Ok(Self { config, handler })
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, JexError> {
        match command {
            Commands::Render { target, force } => {
                let target = target.as_deref().unwrap_or(INDEX_TARGET);
                if *force {
                    self.handler.invalidate(target)?;
                }
                let body = self.fetch(target).await?;
                Ok(String::from_utf8_lossy(&body).into_owned())
            }
            Commands::Warm => {
                let mut lines = Vec::new();
                lines.push(self.warm_one(INDEX_TARGET).await);
                for identifier in self.config.repositories.keys() {
                    lines.push(self.warm_one(identifier).await);
                }
                Ok(lines.join("\n"))
            }
            Commands::Check { format } => {
                let mut targets = vec![INDEX_TARGET.to_string()];
                targets.extend(self.config.repositories.keys().cloned());

                if format == "json" {
                    let status = json!({
                        "server": self.config.server.name,
                        "catalog_size": self.config.repositories.len(),
                        "cache_ttl_seconds": self.config.cache.ttl_seconds,
                        "targets": targets
                            .iter()
                            .map(|target| {
                                json!({
                                    "target": target,
                                    "fresh": self.handler.is_cached_fresh(target),
                                })
                            })
                            .collect::<Vec<_>>(),
                    });
                    return serde_json::to_string_pretty(&status)
                        .map_err(|e| JexError::Config(format!("failed to encode status: {e}")));
                }

                let mut lines = vec![
                    format!("server: {}", self.config.server.name),
                    format!("catalog: {} extension(s)", self.config.repositories.len()),
                    format!("cache ttl: {}s", self.config.cache.ttl_seconds),
                ];
                for target in &targets {
                    lines.push(self.freshness_line(target));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    async fn fetch(&self, target: &str) -> Result<Vec<u8>, JexError> {
        let path = if target == INDEX_TARGET {
            "/".to_string()
        } else {
            format!("/{target}.xml")
        };

        let reply = self.handler.handle(&path).await;
        match reply.status {
            200 => Ok(reply.body),
            404 => Err(JexError::Config(format!(
                "'{target}' is not a configured extension"
            ))),
            status => Err(JexError::Config(format!(
                "rendering '{target}' failed with status {status}"
            ))),
        }
    }

    async fn warm_one(&self, target: &str) -> String {
        match self.fetch(target).await {
            Ok(body) => format!("{target}: ok ({} bytes)", body.len()),
            Err(e) => format!("{target}: failed ({e})"),
        }
    }

    fn freshness_line(&self, target: &str) -> String {
        if self.handler.is_cached_fresh(target) {
            format!("{target}: cached (fresh)")
        } else {
            format!("{target}: stale or not cached")
        }
    }
}
