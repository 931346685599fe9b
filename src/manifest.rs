//! Extension Manifests
//!
//! Parses the XML descriptor an extension ships in its default branch.
//! Only presence is checked; anything beyond the fields the update feed
//! needs is ignored.

use crate::error::JexError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Fields extracted from an extension manifest.
///
/// `client` and `name` are required; the rest is enforced by the consumer
/// that actually needs it (the single-extension document requires author
/// details, the catalog index does not).
#[derive(Debug, Clone)]
pub struct Manifest {
    /// The `client` attribute on the root `extension` element.
    pub client: String,
    /// The extension's display name.
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
}

enum Field {
    Name,
    Description,
    Author,
    AuthorUrl,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// The root must be an `extension` element carrying a `client`
    /// attribute; `name`, `description`, `author` and `authorUrl` are read
    /// from its direct children.
    pub fn parse(xml: &str) -> Result<Self, JexError> {
        let mut reader = Reader::from_str(xml);

        let mut depth = 0usize;
        let mut root_seen = false;
        let mut current: Option<Field> = None;

        let mut client = None;
        let mut name = None;
        let mut description = None;
        let mut author = None;
        let mut author_url = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    if depth == 1 {
                        if e.name().as_ref() != b"extension" {
                            return Err(JexError::ManifestField("extension root element"));
                        }
                        root_seen = true;
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"client" {
                                client = Some(attr.unescape_value()?.into_owned());
                            }
                        }
                    } else if depth == 2 {
                        current = match e.name().as_ref() {
                            b"name" => Some(Field::Name),
                            b"description" => Some(Field::Description),
                            b"author" => Some(Field::Author),
                            b"authorUrl" => Some(Field::AuthorUrl),
                            _ => None,
                        };
                    }
                }
                Event::Text(t) => {
                    if let Some(field) = &current {
                        let text = t.unescape()?.trim().to_string();
                        if !text.is_empty() {
                            match field {
                                Field::Name => name = Some(text),
                                Field::Description => description = Some(text),
                                Field::Author => author = Some(text),
                                Field::AuthorUrl => author_url = Some(text),
                            }
                        }
                    }
                }
                Event::End(_) => {
                    if depth == 2 {
                        current = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Empty(e) => {
                    // A childless manifest is legal XML; still honor its
                    // root attributes.
                    if depth == 0 && !root_seen && e.name().as_ref() == b"extension" {
                        root_seen = true;
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"client" {
                                client = Some(attr.unescape_value()?.into_owned());
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_seen {
            return Err(JexError::ManifestField("extension root element"));
        }

        Ok(Self {
            client: client.ok_or(JexError::ManifestField("client attribute"))?,
            name: name.ok_or(JexError::ManifestField("name element"))?,
            description,
            author,
            author_url,
        })
    }
}
