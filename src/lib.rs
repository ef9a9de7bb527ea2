//! rscpix - CPIX document parser and preset exporter.
//!
//! This crate provides:
//! - CPIX (DASH-IF Content Protection Information Exchange) parsing into
//!   content keys, DRM systems and usage rules.
//! - PSSH payload extraction for PlayReady, Widevine and Nagra.
//! - JSON export of the joined model.
//! - Ateme Titan File `commonencryption` preset export and `.kpreset` splicing.
//!
//! Feature flags:
//! - `log`: emit diagnostics through the `log` facade (default).
//! - `cli`: enable the CLI binary.
//!
//! ```no_run
//! use rscpix::cpix::CpixDocument;
//! use rscpix::json::JsonExporter;
//!
//! let doc = CpixDocument::from_path("movie.xml")?;
//! println!("{}", JsonExporter::default().to_json(&doc)?);
//! # Ok::<(), rscpix::error::Error>(())
//! ```

#[macro_use]
mod macros;

/// Titan export settings.
pub mod config;
/// CPIX parsing and document queries.
pub mod cpix;
/// DRM system registry and DRM system entries.
pub mod drm;
/// Common error types and Result alias.
pub mod error;
/// JSON export.
pub mod json;
/// Content keys and key id parsing.
pub mod key;
/// PSSH payload extraction.
pub mod pssh;
/// Titan File preset export.
pub mod titan;
/// Usage rules.
pub mod usage_rule;
/// Output path helpers.
pub mod utils;
