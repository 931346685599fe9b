//! Error types for the update server.
//!
//! A single crate-wide error enum; per-entry skips during feed synthesis are
//! modeled separately as data (see `feed::SkipReason`), not as errors.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum JexError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("remote api request failed: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("remote api returned status {status} for {url}")]
    RemoteStatus { status: u16, url: String },

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("manifest attribute error: {0}")]
    ManifestAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("manifest content is not valid base64: {0}")]
    ManifestEncoding(#[from] base64::DecodeError),

    #[error("manifest content is not valid utf-8: {0}")]
    ManifestUtf8(#[from] std::string::FromUtf8Error),

    #[error("manifest is missing required {0}")]
    ManifestField(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
