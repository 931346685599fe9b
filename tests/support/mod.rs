//! Shared fixtures: an in-memory source-hosting API and a manual clock.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jexupdate::cache::Clock;
use jexupdate::config::JexConfig;
use jexupdate::error::JexError;
use jexupdate::remote::{Release, ReleaseAsset, RemoteFile, RemoteSource};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// In-memory stand-in for the hosting API.
#[derive(Default)]
pub struct MockRemote {
    files: HashMap<(String, String, String), String>,
    releases: HashMap<(String, String), Release>,
    failing: HashSet<(String, String)>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a manifest, base64-encoded the way the real API returns it.
    pub fn with_manifest(mut self, vendor: &str, repo: &str, filename: &str, xml: &str) -> Self {
        self.files.insert(
            (vendor.to_string(), repo.to_string(), filename.to_string()),
            BASE64.encode(xml),
        );
        self
    }

    pub fn with_release(mut self, vendor: &str, repo: &str, tag: &str, assets: &[&str]) -> Self {
        self.releases.insert(
            (vendor.to_string(), repo.to_string()),
            Release {
                tag_name: tag.to_string(),
                html_url: format!("https://github.example.org/{vendor}/{repo}/releases/{tag}"),
                assets: assets
                    .iter()
                    .map(|url| ReleaseAsset {
                        browser_download_url: url.to_string(),
                    })
                    .collect(),
            },
        );
        self
    }

    /// Make every call for this repository fail with a transport error.
    pub fn with_failing_repo(mut self, vendor: &str, repo: &str) -> Self {
        self.failing.insert((vendor.to_string(), repo.to_string()));
        self
    }

    fn check_failing(&self, vendor: &str, repo: &str) -> Result<(), JexError> {
        if self
            .failing
            .contains(&(vendor.to_string(), repo.to_string()))
        {
            return Err(JexError::RemoteStatus {
                status: 500,
                url: format!("mock://{vendor}/{repo}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn get_file(
        &self,
        vendor: &str,
        repo: &str,
        filename: &str,
    ) -> Result<Option<RemoteFile>, JexError> {
        self.check_failing(vendor, repo)?;
        Ok(self
            .files
            .get(&(vendor.to_string(), repo.to_string(), filename.to_string()))
            .map(|content| RemoteFile {
                content: content.clone(),
            }))
    }

    async fn get_latest_release(
        &self,
        vendor: &str,
        repo: &str,
    ) -> Result<Option<Release>, JexError> {
        self.check_failing(vendor, repo)?;
        Ok(self
            .releases
            .get(&(vendor.to_string(), repo.to_string()))
            .cloned())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock(Mutex<SystemTime>);

impl ManualClock {
    pub fn starting_now() -> Self {
        Self(Mutex::new(SystemTime::now()))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock()
    }
}

/// A complete, well-formed manifest for tests.
pub fn manifest_xml(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<extension type="component" version="3.2" client="site" method="upgrade">
  <name>{name}</name>
  <author>Test Author</author>
  <authorUrl>https://example.org/author</authorUrl>
  <description>{name} description</description>
</extension>"#
    )
}

/// Config pointing the cache at a test directory, with the given catalog.
pub fn test_config(cache_dir: &Path, repositories: &[(&str, &str)]) -> JexConfig {
    let mut config = JexConfig::default();
    config.server.name = "Test Updates".to_string();
    config.server.description = "Test update server".to_string();
    config.server.base_url = "https://updates.example.org/".to_string();
    config.cache.dir = cache_dir.to_path_buf();
    config.cache.ttl_seconds = 60;
    config.repositories = repositories
        .iter()
        .map(|(id, vendor)| (id.to_string(), vendor.to_string()))
        .collect();
    config
}
