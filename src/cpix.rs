//! CPIX document parsing and join queries.
//!
//! A [`CpixDocument`] is built in one pass over the XML tree by
//! [`CpixParser`]. Parsing is fail-fast: the first missing or invalid node
//! aborts the whole parse and no partial document is returned. Once built a
//! document is read-only.
use std::path::{Path, PathBuf};

use roxmltree::Node;
use uuid::Uuid;

use crate::drm::{DrmRegistry, DrmSystemEntry};
use crate::error::{Error, Result};
use crate::key::{parse_uuid, ContentKey};
use crate::pssh::{decode_base64, extract_box_data, extract_playready_pro};
use crate::usage_rule::{sort_by_resolution, UsageRule, VideoFilter};

/// Parsed CPIX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpixDocument {
    source: Option<PathBuf>,
    content_keys: Vec<ContentKey>,
    drm_systems: Vec<DrmSystemEntry>,
    usage_rules: Vec<UsageRule>,
}

impl CpixDocument {
    /// Assemble a document from entity lists already in their final order.
    pub fn new(
        source: Option<PathBuf>,
        content_keys: Vec<ContentKey>,
        drm_systems: Vec<DrmSystemEntry>,
        usage_rules: Vec<UsageRule>,
    ) -> Self {
        Self {
            source,
            content_keys,
            drm_systems,
            usage_rules,
        }
    }

    /// Parse a document from memory with the default registry.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        CpixParser::default().parse(xml)
    }

    /// Load and parse a document from disk with the default registry.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        CpixParser::default().parse_file(path)
    }

    /// Path the document was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Content keys in document order.
    pub fn content_keys(&self) -> &[ContentKey] {
        &self.content_keys
    }

    /// DRM system entries in document order.
    pub fn drm_systems(&self) -> &[DrmSystemEntry] {
        &self.drm_systems
    }

    /// Usage rules, ascending by `min_pixels`.
    pub fn usage_rules(&self) -> &[UsageRule] {
        &self.usage_rules
    }

    /// Content key with the given kid, if the document has one.
    pub fn find_content_key(&self, kid: &Uuid) -> Option<&ContentKey> {
        self.content_keys.iter().find(|key| key.kid == *kid)
    }

    /// All DRM entries for a kid, in document order.
    pub fn find_drm_systems(&self, kid: &Uuid) -> impl Iterator<Item = &DrmSystemEntry> + '_ {
        let kid = *kid;
        self.drm_systems.iter().filter(move |drm| drm.kid == kid)
    }

    /// First usage rule for a kid in resolution order.
    pub fn find_usage_rule(&self, kid: &Uuid) -> Option<&UsageRule> {
        self.usage_rules.iter().find(|rule| rule.kid == *kid)
    }

    /// Kids referenced by DRM entries or usage rules but absent from the
    /// content key list, in first-seen order.
    pub fn orphan_kids(&self) -> Vec<Uuid> {
        let mut orphans: Vec<Uuid> = Vec::new();
        let referenced = self
            .drm_systems
            .iter()
            .map(|drm| drm.kid)
            .chain(self.usage_rules.iter().map(|rule| rule.kid));

        for kid in referenced {
            if self.find_content_key(&kid).is_none() && !orphans.contains(&kid) {
                orphans.push(kid);
            }
        }
        orphans
    }
}

/// Walks a CPIX XML tree into a [`CpixDocument`].
#[derive(Debug, Clone, Default)]
pub struct CpixParser {
    registry: DrmRegistry,
}

impl CpixParser {
    /// Parser using `registry` to pick the PSSH extraction rule.
    pub fn new(registry: DrmRegistry) -> Self {
        Self { registry }
    }

    /// Registry used to name and dispatch DRM systems.
    pub fn registry(&self) -> &DrmRegistry {
        &self.registry
    }

    /// Read and parse a document from disk.
    ///
    /// A path that is not a readable file fails with `DocumentNotFound`
    /// before any parsing happens.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<CpixDocument> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::DocumentNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|e| {
            debug!("Failed to read {}: {}", path.display(), e);
            Error::DocumentNotFound(path.to_path_buf())
        })?;

        let mut doc = self.parse(&data)?;
        doc.source = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Parse a document held in memory.
    pub fn parse(&self, xml: &[u8]) -> Result<CpixDocument> {
        let text = std::str::from_utf8(xml)
            .map_err(|e| Error::MalformedDocument(format!("not UTF-8: {}", e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let tree = roxmltree::Document::parse(text)
            .map_err(|e| Error::MalformedDocument(e.to_string()))?;

        let mut content_keys = Vec::new();
        let mut drm_systems = Vec::new();
        let mut usage_rules = Vec::new();

        for section in elements(tree.root_element()) {
            let tag = section.tag_name().name();
            if tag.contains("ContentKeyList") {
                for node in elements(section) {
                    content_keys.push(parse_content_key(node)?);
                }
            } else if tag.contains("DRMSystemList") {
                for node in elements(section) {
                    drm_systems.push(self.parse_drm_system(node)?);
                }
            } else if tag.contains("ContentKeyUsageRuleList") {
                for node in elements(section) {
                    usage_rules.push(parse_usage_rule(node)?);
                }
            } else {
                trace!("Skipping CPIX section {}", tag);
            }
        }

        sort_by_resolution(&mut usage_rules);

        let doc = CpixDocument::new(None, content_keys, drm_systems, usage_rules);
        for kid in doc.orphan_kids() {
            warn!("kid {} is referenced but has no ContentKey", kid);
        }
        debug!(
            "Parsed CPIX document: {} content keys, {} DRM systems, {} usage rules",
            doc.content_keys.len(),
            doc.drm_systems.len(),
            doc.usage_rules.len()
        );
        Ok(doc)
    }

    fn parse_drm_system(&self, node: Node) -> Result<DrmSystemEntry> {
        let kid = required_uuid(node, "DRMSystem", "kid")?;
        let system_id = required_uuid(node, "DRMSystem", "systemId")?;

        let pssh = child_text(node, "PSSH").ok_or_else(|| Error::MissingElement {
            element: "PSSH",
            kid: kid.to_string(),
        })?;
        let content_protection_data =
            child_text(node, "ContentProtectionData").ok_or_else(|| Error::MissingElement {
                element: "ContentProtectionData",
                kid: kid.to_string(),
            })?;

        let pssh_data = match self.registry.lookup(&system_id) {
            Some(system) if system.uses_pssh_box() => extract_box_data(&pssh, &system_id)?,
            Some(_) => extract_playready_pro(&content_protection_data, &kid)?,
            None => {
                warn!("Unknown DRM system {} for kid {}", system_id, kid);
                String::new()
            }
        };

        Ok(DrmSystemEntry {
            kid,
            system_id,
            pssh,
            pssh_data,
            content_protection_data,
        })
    }
}

fn parse_content_key(node: Node) -> Result<ContentKey> {
    let kid = required_uuid(node, "ContentKey", "kid")?;

    let plain_value = child(node, "Data")
        .and_then(|data| child(data, "Secret"))
        .and_then(|secret| child(secret, "PlainValue"))
        .and_then(|value| value.text())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::MissingKeyMaterial {
            kid: kid.to_string(),
        })?;

    ContentKey::new(kid, decode_base64(plain_value)?)
}

fn parse_usage_rule(node: Node) -> Result<UsageRule> {
    let kid = required_uuid(node, "ContentKeyUsageRule", "kid")?;

    let video_filter = match child(node, "VideoFilter") {
        Some(filter) => VideoFilter::new(
            pixels(filter, "minPixels")?,
            pixels(filter, "maxPixels")?,
        ),
        None => VideoFilter::default(),
    };

    Ok(UsageRule {
        kid,
        video_filter,
        audio_filter: child(node, "AudioFilter").is_some(),
    })
}

fn pixels(filter: Node, attribute: &'static str) -> Result<Option<u32>> {
    filter
        .attribute(attribute)
        .map(|value| {
            value.trim().parse::<u32>().map_err(|_| Error::InvalidAttribute {
                element: "VideoFilter",
                attribute,
                value: value.to_string(),
            })
        })
        .transpose()
}

fn required_uuid(node: Node, element: &'static str, attribute: &'static str) -> Result<Uuid> {
    let value = node
        .attribute(attribute)
        .ok_or(Error::MissingAttribute { element, attribute })?;
    parse_uuid(value)
}

fn elements<'a, 'input: 'a>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// First child element with the given local name, whatever its namespace.
fn child<'a, 'input: 'a>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == name)
}

/// Raw text of a child element; an empty element gives an empty string.
fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(|n| n.text().unwrap_or_default().to_string())
}
