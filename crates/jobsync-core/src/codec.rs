//! Identity codec for natural keys.
//!
//! The detail endpoint addresses postings by the standard base64 encoding
//! of the key's UTF-8 bytes. The source decodes the token back to the key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, InvalidInputError};
use crate::types::NaturalKey;

/// Encode a natural key into a transport token.
pub fn encode(key: &NaturalKey) -> String {
    STANDARD.encode(key.as_str().as_bytes())
}

/// Decode a transport token back into the natural key it was made from.
///
/// # Errors
///
/// Returns an error if the token is not valid base64 or not valid UTF-8.
pub fn decode(token: &str) -> Result<NaturalKey, Error> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|e| InvalidInputError::NaturalKey {
            value: token.to_string(),
            reason: format!("invalid token: {}", e),
        })?;

    let text = String::from_utf8(bytes).map_err(|e| InvalidInputError::NaturalKey {
        value: token.to_string(),
        reason: format!("token is not UTF-8: {}", e),
    })?;

    NaturalKey::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_key() {
        let key = NaturalKey::new("10000-1191563787-S").unwrap();
        assert_eq!(encode(&key), "MTAwMDAtMTE5MTU2Mzc4Ny1T");
    }

    #[test]
    fn encoding_is_deterministic() {
        let key = NaturalKey::new("12265-446482_JB4114224-S").unwrap();
        assert_eq!(encode(&key), encode(&key.clone()));
    }

    #[test]
    fn decodes_non_ascii_key() {
        let key = NaturalKey::new("Köln-Stelle-Ä1").unwrap();
        assert_eq!(decode(&encode(&key)).unwrap(), key);
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(decode("not base64!").is_err());
    }
}
