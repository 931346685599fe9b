//! GitHub implementation of the source-hosting interface.
//!
//! Uses the REST v3 contents and releases endpoints. Every request carries
//! a User-Agent (GitHub rejects anonymous clients without one) and honors
//! the configured timeout; there is no retry budget.

use crate::config::RemoteConfig;
use crate::error::JexError;
use crate::remote::{Release, RemoteFile, RemoteSource};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// GitHub REST API client.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, JexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("jexupdate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// GET a JSON resource; 404 maps to `None`, any other non-success
    /// status is an error.
    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>, JexError> {
        debug!("fetching {url}");

        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(JexError::RemoteStatus {
                status: status.as_u16(),
                url,
            }),
        }
    }
}

#[async_trait]
impl RemoteSource for GithubClient {
    async fn get_file(
        &self,
        vendor: &str,
        repo: &str,
        filename: &str,
    ) -> Result<Option<RemoteFile>, JexError> {
        let url = format!(
            "{}/repos/{vendor}/{repo}/contents/{filename}",
            self.api_base
        );
        self.get_json(url).await
    }

    async fn get_latest_release(
        &self,
        vendor: &str,
        repo: &str,
    ) -> Result<Option<Release>, JexError> {
        let url = format!("{}/repos/{vendor}/{repo}/releases/latest", self.api_base);
        self.get_json(url).await
    }
}
