//! PSSH payload extraction.
//!
//! Widevine and Nagra payloads are the PSSH box minus its fixed v0 header.
//! PlayReady payloads are the `<mspr:pro>` text of the content protection data.
use base64::Engine;
use byteorder::{BigEndian, ByteOrder};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Size of a v0 PSSH box header: size, type, version/flags, system id and
/// data size.
pub const PSSH_HEADER_LEN: usize = 32;

const PRO_OPEN: &str = "<mspr:pro>";
const PRO_CLOSE: &str = "</mspr:pro>";

/// Header fields of a PSSH box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsshHeader {
    /// Box size in bytes, header included.
    pub size: u32,
    /// Four-character box type, `pssh` for a well-formed box.
    pub box_type: [u8; 4],
    pub version: u8,
    /// 24-bit box flags.
    pub flags: u32,
    /// DRM system id carried by the box.
    pub system_id: Uuid,
    /// Length of the payload that follows the header.
    pub data_size: u32,
}

impl PsshHeader {
    /// Read the 32-byte header at the start of a PSSH box.
    ///
    /// The fields are read as laid out for version 0 boxes; no check is made
    /// that the box type is actually `pssh`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PSSH_HEADER_LEN {
            return Err(Error::InvalidPssh(format!(
                "box is {} bytes, header needs {}",
                data.len(),
                PSSH_HEADER_LEN
            )));
        }

        let mut box_type = [0u8; 4];
        box_type.copy_from_slice(&data[4..8]);
        let flags = ((data[9] as u32) << 16) | ((data[10] as u32) << 8) | (data[11] as u32);
        let system_id = Uuid::from_slice(&data[12..28])
            .map_err(|_| Error::InvalidPssh("Invalid system ID".to_string()))?;

        Ok(Self {
            size: BigEndian::read_u32(&data[0..4]),
            box_type,
            version: data[8],
            flags,
            system_id,
            data_size: BigEndian::read_u32(&data[28..32]),
        })
    }

    /// Whether the box type is `pssh`.
    pub fn is_pssh(&self) -> bool {
        &self.box_type == b"pssh"
    }
}

/// Decode standard base64, ignoring ASCII whitespace (XML text is often
/// wrapped).
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(Error::Base64DecodeError)
}

/// Strip the header off a base64 PSSH box and re-encode the remaining bytes.
///
/// `expected` is only used for diagnostics: a header that disagrees with it
/// is logged, not rejected.
pub fn extract_box_data(pssh_b64: &str, expected: &Uuid) -> Result<String> {
    let data = decode_base64(pssh_b64)?;
    let header = PsshHeader::parse(&data)?;

    if !header.is_pssh() {
        warn!(
            "PSSH box type is {:?}, expected \"pssh\"",
            String::from_utf8_lossy(&header.box_type)
        );
    }
    if header.version != 0 {
        warn!(
            "PSSH box version {} has key ids inside the stripped header",
            header.version
        );
    }
    if header.system_id != *expected {
        warn!(
            "PSSH box system id {} does not match DRMSystem {}",
            header.system_id, expected
        );
    }
    trace!(
        "PSSH header size={} data_size={} payload={}",
        header.size,
        header.data_size,
        data.len() - PSSH_HEADER_LEN
    );

    Ok(base64::engine::general_purpose::STANDARD.encode(&data[PSSH_HEADER_LEN..]))
}

/// Extract the text between `<mspr:pro>` and `</mspr:pro>` from base64
/// content protection data.
///
/// A missing closing marker yields everything after the opening one.
pub fn extract_playready_pro(content_protection_data_b64: &str, kid: &Uuid) -> Result<String> {
    let text = String::from_utf8(decode_base64(content_protection_data_b64)?)?;

    let start = text
        .find(PRO_OPEN)
        .map(|idx| idx + PRO_OPEN.len())
        .ok_or_else(|| Error::MissingPlayreadyPayload {
            kid: kid.to_string(),
        })?;
    let rest = &text[start..];
    let end = rest.find(PRO_CLOSE).unwrap_or(rest.len());

    Ok(rest[..end].to_string())
}
