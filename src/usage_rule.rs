//! `ContentKeyUsageRule` entity.

use serde::Serialize;
use uuid::Uuid;

/// Smallest pixel count a video filter can start at.
pub const DEFAULT_MIN_PIXELS: u32 = 1;

/// Pixel count just above 8K (7680x4320 + 1).
pub const DEFAULT_MAX_PIXELS: u32 = 34_041_601;

/// Resolution bounds of a usage rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoFilter {
    pub min_pixels: u32,
    pub max_pixels: u32,
}

impl VideoFilter {
    /// Build a filter, substituting the defaults for missing bounds.
    pub fn new(min_pixels: Option<u32>, max_pixels: Option<u32>) -> Self {
        Self {
            min_pixels: min_pixels.unwrap_or(DEFAULT_MIN_PIXELS),
            max_pixels: max_pixels.unwrap_or(DEFAULT_MAX_PIXELS),
        }
    }
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A `ContentKeyUsageRule` element of a CPIX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRule {
    /// Content key id the rule applies to.
    pub kid: Uuid,
    pub video_filter: VideoFilter,
    /// True when the rule carries an `AudioFilter`.
    pub audio_filter: bool,
}

/// Order rules by ascending `min_pixels`; ties keep document order.
///
/// Exporters read list order as video tier priority.
pub fn sort_by_resolution(rules: &mut [UsageRule]) {
    rules.sort_by_key(|rule| rule.video_filter.min_pixels);
}
