//! Update Feed Synthesis
//!
//! Builds the two XML documents the Joomla updater consumes: the catalog
//! index (`extensionset`) and the per-extension update descriptor
//! (`updates`). Both documents are derived from the same per-extension
//! pipeline: fetch the manifest, fetch the latest release, derive fields.
//!
//! A failure while resolving one extension is a `SkipReason`, not an error:
//! the index omits the entry and keeps going, the single-extension document
//! reports "no document" or a typed error to its caller.

use crate::catalog::{manifest_filename, ExtensionKind};
use crate::error::JexError;
use crate::manifest::Manifest;
use crate::remote::RemoteSource;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Why one catalog entry produced no feed data.
#[derive(Debug)]
pub enum SkipReason {
    /// The manifest file does not exist in the default branch.
    MissingManifest,
    /// No published release, or a release without downloadable assets.
    NoInstallerAsset,
    /// Transport, decoding or parse failure.
    Failed(JexError),
}

/// Everything the feed knows about one extension once both remote lookups
/// have succeeded.
#[derive(Debug, Clone)]
pub struct ResolvedExtension {
    pub identifier: String,
    pub kind: Option<ExtensionKind>,
    pub client: String,
    pub name: String,
    pub description: String,
    pub author: Option<String>,
    pub author_url: Option<String>,
    /// Release tag with a single leading `v` stripped.
    pub version: String,
    /// Release page URL.
    pub info_url: String,
    /// First downloadable asset of the release.
    pub download_url: String,
}

/// Synthesizes update feed documents from remote repository state.
pub struct FeedBuilder {
    remote: Arc<dyn RemoteSource>,
    package_format: String,
}

impl FeedBuilder {
    pub fn new(remote: Arc<dyn RemoteSource>, package_format: String) -> Self {
        Self {
            remote,
            package_format,
        }
    }

    /// Render the catalog index document.
    ///
    /// Every entry is processed independently; entries that cannot be
    /// resolved are logged and omitted, never aborting their siblings.
    /// An empty catalog renders a root element with no children.
    pub async fn build_collection_xml(
        &self,
        server_name: &str,
        server_description: &str,
        entries: &BTreeMap<String, String>,
        base_uri: &Url,
    ) -> Result<Vec<u8>, JexError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("extensionset");
        root.push_attribute(("name", server_name));
        root.push_attribute(("description", server_description));
        writer.write_event(Event::Start(root))?;

        for (identifier, vendor) in entries {
            let extension = match self.resolve_extension(vendor, identifier).await {
                Ok(extension) => extension,
                Err(SkipReason::MissingManifest) => {
                    debug!("{vendor}/{identifier} has no manifest in its default branch, skipping");
                    continue;
                }
                Err(SkipReason::NoInstallerAsset) => {
                    warn!("{vendor}/{identifier} does not have a valid installer asset, skipping");
                    continue;
                }
                Err(SkipReason::Failed(e)) => {
                    error!("failed to resolve {vendor}/{identifier}: {e}");
                    continue;
                }
            };

            let mut element = BytesStart::new("extension");
            element.push_attribute(("name", extension.identifier.as_str()));
            element.push_attribute(("element", extension.identifier.as_str()));
            element.push_attribute((
                "type",
                extension.kind.map(|k| k.as_str()).unwrap_or_default(),
            ));
            element.push_attribute(("client", extension.client.as_str()));
            element.push_attribute(("client_id", extension.client.as_str()));
            element.push_attribute(("version", extension.version.as_str()));
            element.push_attribute((
                "detailsurl",
                details_url(base_uri, &extension.identifier).as_str(),
            ));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("extensionset")))?;
        Ok(writer.into_inner())
    }

    /// Render the update descriptor for a single extension.
    ///
    /// `Ok(None)` means the upstream data is incomplete (no manifest, or a
    /// release without assets); a partial document is never produced.
    pub async fn build_extension_xml(
        &self,
        vendor: &str,
        identifier: &str,
    ) -> Result<Option<Vec<u8>>, JexError> {
        match self.resolve_extension(vendor, identifier).await {
            Ok(extension) => Ok(Some(self.render_update(&extension)?)),
            Err(SkipReason::MissingManifest) => {
                debug!("{vendor}/{identifier} has no manifest in its default branch");
                Ok(None)
            }
            Err(SkipReason::NoInstallerAsset) => {
                warn!("{vendor}/{identifier} does not have a valid installer asset");
                Ok(None)
            }
            Err(SkipReason::Failed(e)) => Err(e),
        }
    }

    /// Run the shared per-extension pipeline: manifest, then release.
    async fn resolve_extension(
        &self,
        vendor: &str,
        identifier: &str,
    ) -> Result<ResolvedExtension, SkipReason> {
        let kind = ExtensionKind::from_identifier(identifier);
        let filename = manifest_filename(identifier);

        let file = self
            .remote
            .get_file(vendor, identifier, &filename)
            .await
            .map_err(SkipReason::Failed)?
            .ok_or(SkipReason::MissingManifest)?;

        let manifest = decode_manifest(&file.content).map_err(SkipReason::Failed)?;

        let release = self
            .remote
            .get_latest_release(vendor, identifier)
            .await
            .map_err(SkipReason::Failed)?
            .ok_or(SkipReason::NoInstallerAsset)?;

        let download_url = release
            .assets
            .first()
            .map(|asset| asset.browser_download_url.clone())
            .ok_or(SkipReason::NoInstallerAsset)?;

        let description = manifest
            .description
            .clone()
            .unwrap_or_else(|| manifest.name.clone());

        Ok(ResolvedExtension {
            identifier: identifier.to_string(),
            kind,
            client: manifest.client,
            name: manifest.name,
            description,
            author: manifest.author,
            author_url: manifest.author_url,
            version: strip_release_tag(&release.tag_name).to_string(),
            info_url: release.html_url,
            download_url,
        })
    }

    fn render_update(&self, extension: &ResolvedExtension) -> Result<Vec<u8>, JexError> {
        let author = extension
            .author
            .as_deref()
            .ok_or(JexError::ManifestField("author element"))?;
        let author_url = extension
            .author_url
            .as_deref()
            .ok_or(JexError::ManifestField("authorUrl element"))?;

        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("updates")))?;
        writer.write_event(Event::Start(BytesStart::new("update")))?;

        text_element(&mut writer, "name", &extension.name)?;
        text_element(&mut writer, "description", &extension.description)?;
        text_element(&mut writer, "element", &extension.identifier)?;
        text_element(
            &mut writer,
            "type",
            extension.kind.map(|k| k.as_str()).unwrap_or_default(),
        )?;
        text_element(&mut writer, "version", &extension.version)?;
        text_element(&mut writer, "infourl", &extension.info_url)?;
        text_element(&mut writer, "client", &extension.client)?;

        writer.write_event(Event::Start(BytesStart::new("downloads")))?;
        let mut download = BytesStart::new("downloadurl");
        download.push_attribute(("type", "upgrade"));
        download.push_attribute(("format", self.package_format.as_str()));
        writer.write_event(Event::Start(download))?;
        writer.write_event(Event::Text(BytesText::new(&extension.download_url)))?;
        writer.write_event(Event::End(BytesEnd::new("downloadurl")))?;
        writer.write_event(Event::End(BytesEnd::new("downloads")))?;

        writer.write_event(Event::Start(BytesStart::new("tags")))?;
        text_element(&mut writer, "tag", "stable")?;
        writer.write_event(Event::End(BytesEnd::new("tags")))?;

        text_element(&mut writer, "maintainer", author)?;
        text_element(&mut writer, "maintainerurl", author_url)?;

        let mut platform = BytesStart::new("targetplatform");
        platform.push_attribute(("name", "joomla"));
        platform.push_attribute(("version", "3.[23456789]"));
        writer.write_event(Event::Empty(platform))?;

        writer.write_event(Event::End(BytesEnd::new("update")))?;
        writer.write_event(Event::End(BytesEnd::new("updates")))?;
        Ok(writer.into_inner())
    }
}

/// Decode a base64 manifest payload and parse it.
///
/// The hosting API wraps base64 at 60 columns; whitespace is stripped
/// before decoding.
fn decode_manifest(content: &str) -> Result<Manifest, JexError> {
    let compact: String = content.split_whitespace().collect();
    let bytes = BASE64.decode(compact)?;
    Manifest::parse(&String::from_utf8(bytes)?)
}

/// Strip exactly one leading `v` from a release tag.
pub(crate) fn strip_release_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Rewrite the base URI's path to `<identifier>.xml`, keeping scheme and
/// authority.
pub(crate) fn details_url(base: &Url, identifier: &str) -> String {
    let mut url = base.clone();
    url.set_path(&format!("{identifier}.xml"));
    url.to_string()
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), JexError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
