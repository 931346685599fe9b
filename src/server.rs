//! Request Handling
//!
//! The value-level HTTP contract of the service: resolve the requested
//! target, serve it from the cache when fresh, otherwise regenerate through
//! the feed synthesizer and replace the cache file. Routing and socket
//! plumbing belong to the host environment.

use crate::cache::{CacheStore, Clock};
use crate::concurrency::TargetLockManager;
use crate::config::JexConfig;
use crate::error::JexError;
use crate::feed::FeedBuilder;
use crate::remote::RemoteSource;
use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Synthetic target name for the catalog index document.
pub const INDEX_TARGET: &str = "index";

/// Minimal HTTP response value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl HttpReply {
    fn xml(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/xml"),
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Upstream data was incomplete; nothing valid to serve.
    fn bad_gateway() -> Self {
        Self {
            status: 502,
            content_type: None,
            body: Vec::new(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: 500,
            content_type: None,
            body: Vec::new(),
        }
    }
}

enum Target {
    Index,
    Extension { identifier: String, vendor: String },
}

impl Target {
    fn name(&self) -> &str {
        match self {
            Target::Index => INDEX_TARGET,
            Target::Extension { identifier, .. } => identifier,
        }
    }
}

/// Serves update documents for the configured extension catalog.
pub struct UpdateHandler {
    server_name: String,
    server_description: String,
    base_uri: Url,
    catalog: BTreeMap<String, String>,
    feed: FeedBuilder,
    cache: CacheStore,
    locks: TargetLockManager,
}

impl UpdateHandler {
    pub fn new(
        config: &JexConfig,
        remote: Arc<dyn RemoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JexError> {
        let base_uri = Url::parse(&config.server.base_url).map_err(|e| {
            JexError::Config(format!(
                "invalid server.base_url '{}': {e}",
                config.server.base_url
            ))
        })?;

        Ok(Self {
            server_name: config.server.name.clone(),
            server_description: config.server.description.clone(),
            base_uri,
            catalog: config.repositories.clone(),
            feed: FeedBuilder::new(remote, config.feed.package_format.clone()),
            cache: CacheStore::new(
                config.cache.dir.clone(),
                Duration::from_secs(config.cache.ttl_seconds),
                clock,
            ),
            locks: TargetLockManager::new(),
        })
    }

    /// Handle one request path.
    ///
    /// `/` and `/index.xml` serve the catalog index; `/{id}.xml` serves the
    /// update descriptor for a configured extension and 404s otherwise.
    pub async fn handle(&self, path: &str) -> HttpReply {
        let Some(target) = self.resolve_target(path) else {
            return HttpReply::not_found();
        };

        match self.resolve_document(&target).await {
            Ok(Some(body)) => HttpReply::xml(body),
            Ok(None) => HttpReply::bad_gateway(),
            Err(e) => {
                error!("failed to produce document for '{}': {e}", target.name());
                HttpReply::internal_error()
            }
        }
    }

    /// Freshness of the cached document for a target name, for operational
    /// tooling. Unknown targets report stale.
    pub fn is_cached_fresh(&self, target: &str) -> bool {
        !self.cache.is_stale(target)
    }

    /// Drop the cached document for a target, forcing regeneration on the
    /// next request.
    pub fn invalidate(&self, target: &str) -> Result<(), JexError> {
        match std::fs::remove_file(self.cache.path_for(target)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve_target(&self, path: &str) -> Option<Target> {
        let segment = path.trim_matches('/').rsplit('/').next().unwrap_or("");
        if segment.is_empty() {
            return Some(Target::Index);
        }

        let identifier = segment.split('.').next().unwrap_or(segment);
        if identifier == INDEX_TARGET {
            return Some(Target::Index);
        }

        let vendor = self.catalog.get(identifier)?;
        Some(Target::Extension {
            identifier: identifier.to_string(),
            vendor: vendor.clone(),
        })
    }

    async fn resolve_document(&self, target: &Target) -> Result<Option<Vec<u8>>, JexError> {
        let name = target.name();

        if let Some(bytes) = self.read_fresh(name) {
            return Ok(Some(bytes));
        }

        // Single-flight per target: concurrent misses wait here and then
        // find the freshly written file on the re-check.
        let lock = self.locks.lock_for(name);
        let _guard = lock.lock().await;

        if let Some(bytes) = self.read_fresh(name) {
            return Ok(Some(bytes));
        }

        info!("cache file {} is not valid, generating a new document", self.cache.path_for(name).display());
        let rendered = match target {
            Target::Index => Some(
                self.feed
                    .build_collection_xml(
                        &self.server_name,
                        &self.server_description,
                        &self.catalog,
                        &self.base_uri,
                    )
                    .await?,
            ),
            Target::Extension { identifier, vendor } => {
                self.feed.build_extension_xml(vendor, identifier).await?
            }
        };

        match rendered {
            Some(bytes) => {
                self.cache.write_atomic(name, &bytes)?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Cached bytes when the file is fresh and readable; a read failure on
    /// a fresh file is treated as a miss.
    fn read_fresh(&self, name: &str) -> Option<Vec<u8>> {
        if self.cache.is_stale(name) {
            return None;
        }
        match self.cache.read(name) {
            Ok(bytes) => {
                info!("serving {} from cache", self.cache.path_for(name).display());
                Some(bytes)
            }
            Err(_) => None,
        }
    }
}
