//! Error types for rscpix.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for rscpix operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The CPIX document path does not exist or is not a readable file.
    #[error("CPIX document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// The document is not well-formed XML.
    #[error("Malformed CPIX document: {0}")]
    MalformedDocument(String),

    /// A required child element is absent.
    #[error("Missing {element} element for kid {kid}")]
    MissingElement { element: &'static str, kid: String },

    /// A required attribute is absent.
    #[error("Missing {attribute} attribute on {element} element")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The `Data/Secret/PlainValue` path of a content key is absent.
    #[error("Missing key material (Data/Secret/PlainValue) for kid {kid}")]
    MissingKeyMaterial { kid: String },

    /// The PlayReady content protection data holds no `<mspr:pro>` payload.
    #[error("Missing <mspr:pro> payload in PlayReady ContentProtectionData for kid {kid}")]
    MissingPlayreadyPayload { kid: String },

    /// The splice marker could not be found in the host preset.
    #[error("Marker {marker} not found in host preset")]
    HostMarkerNotFound { marker: &'static str },

    /// A kid or system id is not a valid UUID.
    #[error("Invalid UUID: {value:?}")]
    InvalidUuid { value: String },

    /// An attribute value could not be interpreted.
    #[error("Invalid {attribute} value {value:?} on {element} element")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// The decoded content key is not 128 bits.
    #[error("Invalid key length for kid {kid}: expected 16 bytes, got {len}")]
    InvalidKeyLength { kid: String, len: usize },

    /// The PSSH box is too short to carry a header.
    #[error("Invalid PSSH: {0}")]
    InvalidPssh(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    /// Decoded bytes are not valid UTF-8.
    #[error("UTF-8 decode error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Failed to write the preset XML.
    #[error("XML write error: {0}")]
    XmlWriteError(String),

    /// Failed to serialize JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration file.
    #[error("Invalid config: {0}")]
    ConfigError(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for rscpix operations.
pub type Result<T> = std::result::Result<T, Error>;
