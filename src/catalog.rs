//! Extension Catalog
//!
//! Identity rules for the configured extensions: the kind encoded in an
//! identifier's prefix and the manifest filename that kind implies.

/// Joomla extension kind, derived from the identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Component,
    Module,
    Plugin,
    Template,
    Package,
    Library,
}

impl ExtensionKind {
    /// Derive the kind from the first three characters of an identifier.
    ///
    /// Unrecognized prefixes yield `None`. Callers must keep that absence
    /// visible in their output rather than substituting a default.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.get(..3) {
            Some("com") => Some(Self::Component),
            Some("mod") => Some(Self::Module),
            Some("plg") => Some(Self::Plugin),
            Some("tpl") => Some(Self::Template),
            Some("pkg") => Some(Self::Package),
            Some("lib") => Some(Self::Library),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Module => "module",
            Self::Plugin => "plugin",
            Self::Template => "template",
            Self::Package => "package",
            Self::Library => "library",
        }
    }
}

/// Manifest filename in the extension's default branch.
///
/// Templates ship their manifest as `templateDetails.xml`; every other kind
/// names it after the identifier.
pub fn manifest_filename(identifier: &str) -> String {
    match ExtensionKind::from_identifier(identifier) {
        Some(ExtensionKind::Template) => "templateDetails.xml".to_string(),
        _ => format!("{identifier}.xml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_the_three_character_prefix() {
        assert_eq!(
            ExtensionKind::from_identifier("com_articles"),
            Some(ExtensionKind::Component)
        );
        assert_eq!(
            ExtensionKind::from_identifier("mod_latest"),
            Some(ExtensionKind::Module)
        );
        assert_eq!(
            ExtensionKind::from_identifier("plg_search_foo"),
            Some(ExtensionKind::Plugin)
        );
        assert_eq!(
            ExtensionKind::from_identifier("tpl_flat"),
            Some(ExtensionKind::Template)
        );
        assert_eq!(
            ExtensionKind::from_identifier("pkg_bundle"),
            Some(ExtensionKind::Package)
        );
        assert_eq!(
            ExtensionKind::from_identifier("lib_shared"),
            Some(ExtensionKind::Library)
        );
    }

    #[test]
    fn unknown_prefixes_have_no_kind() {
        assert_eq!(ExtensionKind::from_identifier("xyz_thing"), None);
        assert_eq!(ExtensionKind::from_identifier(""), None);
        assert_eq!(ExtensionKind::from_identifier("co"), None);
    }

    #[test]
    fn templates_use_the_fixed_manifest_filename() {
        assert_eq!(manifest_filename("tpl_flat"), "templateDetails.xml");
        assert_eq!(manifest_filename("com_articles"), "com_articles.xml");
        assert_eq!(manifest_filename("unknown_kind"), "unknown_kind.xml");
    }
}
