//! JSON export of a parsed CPIX document.
use serde::Serialize;

use crate::cpix::CpixDocument;
use crate::drm::DrmRegistry;
use crate::error::Result;
use crate::usage_rule::{UsageRule, VideoFilter};

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    cpix_file_path: Option<String>,
    content_key_list: Vec<JsonContentKey<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonContentKey<'a> {
    kid: String,
    key: String,
    drm_system_list: Vec<JsonDrmSystem<'a>>,
    usage_rule: Option<JsonUsageRule>,
}

#[derive(Debug, Serialize)]
struct JsonDrmSystem<'a> {
    name: &'static str,
    system_id: String,
    pssh: &'a str,
    pssh_data: &'a str,
    content_protection_data: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonUsageRule {
    video_filter: VideoFilter,
    audio_filter: bool,
}

impl From<&UsageRule> for JsonUsageRule {
    fn from(rule: &UsageRule) -> Self {
        Self {
            video_filter: rule.video_filter,
            audio_filter: rule.audio_filter,
        }
    }
}

/// Renders a document as one JSON object per content key, with its DRM
/// systems and usage rule joined in.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    registry: DrmRegistry,
}

impl JsonExporter {
    /// Exporter naming DRM systems through `registry`.
    pub fn new(registry: DrmRegistry) -> Self {
        Self { registry }
    }

    /// Compact JSON.
    pub fn to_json(&self, doc: &CpixDocument) -> Result<String> {
        Ok(serde_json::to_string(&self.build(doc))?)
    }

    /// Pretty-printed JSON, same content as [`JsonExporter::to_json`].
    pub fn to_json_pretty(&self, doc: &CpixDocument) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.build(doc))?)
    }

    fn build<'a>(&self, doc: &'a CpixDocument) -> JsonDocument<'a> {
        let content_key_list = doc
            .content_keys()
            .iter()
            .map(|key| JsonContentKey {
                kid: key.kid.to_string(),
                key: key.key_hex(),
                drm_system_list: doc
                    .find_drm_systems(&key.kid)
                    .map(|drm| JsonDrmSystem {
                        name: self.registry.name_for(&drm.system_id),
                        system_id: drm.system_id.to_string(),
                        pssh: &drm.pssh,
                        pssh_data: &drm.pssh_data,
                        content_protection_data: &drm.content_protection_data,
                    })
                    .collect(),
                usage_rule: doc.find_usage_rule(&key.kid).map(JsonUsageRule::from),
            })
            .collect();

        JsonDocument {
            cpix_file_path: doc.source().map(|path| path.display().to_string()),
            content_key_list,
        }
    }
}
