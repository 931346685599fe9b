//! Source-Hosting Collaborator
//!
//! Narrow interface to the API that hosts the extension repositories.
//! The feed synthesizer only ever asks for two things: the bytes of a named
//! file in the default branch, and the latest published release.

pub mod github;

use crate::error::JexError;
use async_trait::async_trait;
use serde::Deserialize;

pub use github::GithubClient;

/// A file fetched from a repository's default branch.
///
/// Content arrives base64-encoded, exactly as the hosting API returns it;
/// decoding is the consumer's concern.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub content: String,
}

/// One downloadable asset attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub browser_download_url: String,
}

/// The latest published release of a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Version tag, possibly with a leading `v`.
    pub tag_name: String,
    /// Human-readable release page.
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Read access to the source-hosting API.
///
/// `Ok(None)` means the resource does not exist; transport failures and
/// unexpected statuses are errors.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the content of `filename` from the repository's default branch.
    async fn get_file(
        &self,
        vendor: &str,
        repo: &str,
        filename: &str,
    ) -> Result<Option<RemoteFile>, JexError>;

    /// Fetch metadata for the latest published release.
    async fn get_latest_release(
        &self,
        vendor: &str,
        repo: &str,
    ) -> Result<Option<Release>, JexError>;
}
