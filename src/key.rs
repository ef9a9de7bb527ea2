//! Content key entity and key id handling.
//!
//! Every kid and system id read from a document goes through [`parse_uuid`],
//! so the rest of the crate only ever compares `Uuid` values.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Length of a CENC content key in bytes.
pub const CONTENT_KEY_LEN: usize = 16;

/// A `ContentKey` element of a CPIX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey {
    /// Key ID as UUID.
    pub kid: Uuid,
    /// Plain key bytes.
    pub key: Vec<u8>,
}

impl ContentKey {
    /// Create a new ContentKey, checking the key is 128 bits.
    pub fn new(kid: Uuid, key: Vec<u8>) -> Result<Self> {
        if key.len() != CONTENT_KEY_LEN {
            return Err(Error::InvalidKeyLength {
                kid: kid.to_string(),
                len: key.len(),
            });
        }
        Ok(Self { kid, key })
    }

    /// Key bytes as lowercase hex.
    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }
}

/// Parse a textual UUID into its canonical value.
///
/// Accepts any form `uuid` accepts (hyphenated, simple, braced, any case);
/// surrounding whitespace is ignored.
pub fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| Error::InvalidUuid {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_uuid, ContentKey};
    use crate::error::Error;

    #[test]
    fn uuid_text_is_normalized() {
        let upper = parse_uuid("EB676ABB-CB34-5E96-BBCF-616630F1A3DA").unwrap();
        let simple = parse_uuid("eb676abbcb345e96bbcf616630f1a3da").unwrap();
        assert_eq!(upper, simple);
        assert_eq!(upper.to_string(), "eb676abb-cb34-5e96-bbcf-616630f1a3da");
    }

    #[test]
    fn invalid_uuid_is_error() {
        let err = parse_uuid("not-a-kid").expect_err("should fail");
        assert!(matches!(err, Error::InvalidUuid { .. }));
    }

    #[test]
    fn key_hex_is_lowercase() {
        let kid = parse_uuid("eb676abb-cb34-5e96-bbcf-616630f1a3da").unwrap();
        let key = ContentKey::new(kid, vec![0xAB; 16]).unwrap();
        assert_eq!(key.key_hex(), "abababababababababababababababab");
    }

    #[test]
    fn short_key_is_rejected() {
        let kid = parse_uuid("eb676abb-cb34-5e96-bbcf-616630f1a3da").unwrap();
        let err = ContentKey::new(kid, vec![1, 2, 3]).expect_err("should fail");
        assert!(matches!(err, Error::InvalidKeyLength { len: 3, .. }));
    }
}
