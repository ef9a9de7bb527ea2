//! Ateme Titan File preset export.
//!
//! The `commonencryption` fragment is built with an XML writer. Splicing it
//! into an existing `.kpreset` is a plain text operation kept separate in
//! [`splice_common_encryption`]: the rest of the host file is never parsed.
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::TitanConfig;
use crate::cpix::CpixDocument;
use crate::drm::DrmRegistry;
use crate::error::{Error, Result};

const OPEN_MARKER: &str = "<commonencryption>";
const CLOSE_MARKER: &str = "</commonencryption>";
const INDENT_SIZE: usize = 2;

/// Renders the `commonencryption` element of a Titan File preset.
#[derive(Debug, Clone, Default)]
pub struct TitanExporter {
    registry: DrmRegistry,
    config: TitanConfig,
}

impl TitanExporter {
    /// Exporter naming systems through `registry` and writing the `server`
    /// and IV size from `config`.
    pub fn new(registry: DrmRegistry, config: TitanConfig) -> Self {
        Self { registry, config }
    }

    /// Settings used for the `server` element and IV size.
    pub fn config(&self) -> &TitanConfig {
        &self.config
    }

    /// Build the fragment.
    ///
    /// One `drm` element is written per usage rule, content key and DRM
    /// system sharing a kid, looping over usage rules (ascending
    /// `min_pixels`), then content keys, then DRM systems. `idx` counts from
    /// 1 across the whole fragment.
    pub fn to_titan_xml(&self, doc: &CpixDocument) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);

        writer
            .write_event(Event::Start(BytesStart::new("commonencryption")))
            .map_err(xml_error)?;

        let server = &self.config.server;
        writer
            .create_element("server")
            .with_attribute(("enabled", if server.enabled { "true" } else { "false" }))
            .with_attribute(("type", server.server_type.as_str()))
            .with_attribute(("url", server.url.as_str()))
            .write_empty()
            .map_err(xml_error)?;

        let mut idx = 0usize;
        for rule in doc.usage_rules() {
            for key in doc.content_keys().iter().filter(|key| key.kid == rule.kid) {
                let kid = key.kid.to_string();
                let content = key.key_hex();

                for drm in doc.find_drm_systems(&key.kid) {
                    idx += 1;
                    let idx_text = idx.to_string();
                    let system_id = drm.system_id.to_string();

                    let mut start = BytesStart::new("drm");
                    start.push_attribute(("idx", idx_text.as_str()));
                    start.push_attribute(("system_id", system_id.as_str()));
                    start.push_attribute(("scheme_value", self.registry.name_for(&drm.system_id)));
                    writer.write_event(Event::Start(start)).map_err(xml_error)?;

                    writer
                        .create_element("key")
                        .with_attribute(("id", kid.as_str()))
                        .with_attribute(("content", content.as_str()))
                        .write_empty()
                        .map_err(xml_error)?;
                    writer
                        .create_element("data")
                        .write_text_content(BytesText::new(&drm.pssh_data))
                        .map_err(xml_error)?;
                    writer
                        .create_element("initialization_vector_size")
                        .write_text_content(BytesText::new(&self.config.initialization_vector_size))
                        .map_err(xml_error)?;

                    writer
                        .write_event(Event::End(BytesEnd::new("drm")))
                        .map_err(xml_error)?;
                }
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("commonencryption")))
            .map_err(xml_error)?;

        debug!("Built commonencryption fragment with {} drm entries", idx);
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Build the fragment and splice it into `host`, replacing the host's
    /// existing `commonencryption` element.
    pub fn to_titan_xml_spliced(&self, doc: &CpixDocument, host: &str) -> Result<String> {
        // Fail on the markers before doing any work.
        locate_markers(host)?;
        let fragment = self.to_titan_xml(doc)?;
        splice_common_encryption(host, &fragment)
    }
}

fn xml_error<E: std::fmt::Display>(e: E) -> Error {
    Error::XmlWriteError(e.to_string())
}

/// Byte range from the first `<commonencryption>` to the end of the
/// following `</commonencryption>`.
fn locate_markers(host: &str) -> Result<(usize, usize)> {
    let start = host.find(OPEN_MARKER).ok_or(Error::HostMarkerNotFound {
        marker: OPEN_MARKER,
    })?;
    let close = host[start..]
        .find(CLOSE_MARKER)
        .ok_or(Error::HostMarkerNotFound {
            marker: CLOSE_MARKER,
        })?;
    Ok((start, start + close + CLOSE_MARKER.len()))
}

/// Replace the first `<commonencryption>` ... `</commonencryption>` span of
/// `host` with `fragment`.
///
/// The fragment is inserted verbatim, since `data` text may span lines. Text
/// outside the span is kept byte for byte.
pub fn splice_common_encryption(host: &str, fragment: &str) -> Result<String> {
    let (start, end) = locate_markers(host)?;

    let mut out = String::with_capacity(host.len() - (end - start) + fragment.len());
    out.push_str(&host[..start]);
    out.push_str(fragment);
    out.push_str(&host[end..]);

    trace!("Spliced fragment into host preset at bytes {}..{}", start, end);
    Ok(out)
}
