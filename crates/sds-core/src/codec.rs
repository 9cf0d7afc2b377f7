//! # Identifier Codec
//!
//! Reversible, keyed transform between [`InternalId`] and [`ExternalToken`].
//!
//! Tokens are Fernet tokens (AES-128-CBC with HMAC-SHA256, fresh random IV
//! per call), so encoding the same id twice yields two different tokens
//! that both decode to it. A token produced under one key never verifies
//! under another.
//!
//! ## Key Rotation
//!
//! The codec encodes with its primary key only. Retired keys are tried on
//! decode so tokens issued before a rotation keep working until the retired
//! key is removed from configuration.

use std::sync::Arc;

use fernet::Fernet;
use zeroize::Zeroizing;

use crate::error::CodecError;
use crate::id::{ExternalToken, InternalId};

struct Keys {
    primary: Fernet,
    retired: Vec<Fernet>,
}

/// Keyed id codec. Cheap to clone; key material is shared and immutable.
///
/// Custom `Debug` implementation never prints key material.
#[derive(Clone)]
pub struct IdCodec {
    keys: Arc<Keys>,
}

impl std::fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdCodec")
            .field("primary", &"[REDACTED]")
            .field("retired_keys", &self.keys.retired.len())
            .finish()
    }
}

impl IdCodec {
    /// Build a codec from a single Fernet key (URL-safe base64, 32 bytes).
    pub fn new(primary: &str) -> Result<Self, CodecError> {
        Self::with_retired(primary, &[] as &[&str])
    }

    /// Build a codec that encodes with `primary` and also decodes tokens
    /// issued under any of `retired`.
    pub fn with_retired<S: AsRef<str>>(primary: &str, retired: &[S]) -> Result<Self, CodecError> {
        let primary = parse_key(primary, "primary")?;
        let retired = retired
            .iter()
            .enumerate()
            .map(|(i, k)| parse_key(k.as_ref(), &format!("retired[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keys: Arc::new(Keys { primary, retired }),
        })
    }

    /// Generate a fresh random Fernet key.
    pub fn generate_key() -> Zeroizing<String> {
        Zeroizing::new(Fernet::generate_key())
    }

    /// Encode an id into a new token.
    pub fn encode(&self, id: InternalId) -> ExternalToken {
        ExternalToken::new(self.keys.primary.encrypt(id.get().to_string().as_bytes()))
    }

    /// Decode a token back to the id that produced it.
    pub fn decode(&self, token: &str) -> Result<InternalId, CodecError> {
        let plaintext = std::iter::once(&self.keys.primary)
            .chain(self.keys.retired.iter())
            .find_map(|key| key.decrypt(token).ok())
            .map(Zeroizing::new)
            .ok_or(CodecError::InvalidToken)?;

        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| CodecError::Format("payload is not UTF-8".into()))?;
        text.parse::<u64>()
            .map(InternalId::new)
            .map_err(|e| CodecError::Format(format!("{text:?}: {e}")))
    }
}

fn parse_key(raw: &str, which: &str) -> Result<Fernet, CodecError> {
    Fernet::new(raw.trim()).ok_or_else(|| {
        CodecError::InvalidKey(format!(
            "{which} key must be 32 url-safe base64-encoded bytes"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> IdCodec {
        IdCodec::new(&IdCodec::generate_key()).unwrap()
    }

    #[test]
    fn round_trip_returns_original_id() {
        let codec = codec();
        let token = codec.encode(InternalId::new(42));
        assert_eq!(codec.decode(token.as_str()).unwrap(), InternalId::new(42));
    }

    #[test]
    fn repeated_encodes_differ_but_decode_equal() {
        let codec = codec();
        let a = codec.encode(InternalId::new(7));
        let b = codec.encode(InternalId::new(7));
        assert_ne!(a, b);
        assert_eq!(codec.decode(a.as_str()).unwrap(), InternalId::new(7));
        assert_eq!(codec.decode(b.as_str()).unwrap(), InternalId::new(7));
    }

    #[test]
    fn token_does_not_leak_plain_id() {
        let codec = codec();
        let token = codec.encode(InternalId::new(123_456_789));
        assert!(!token.as_str().contains("123456789"));
    }

    #[test]
    fn different_keys_do_not_cross_decode() {
        let a = codec();
        let b = codec();
        let token = a.encode(InternalId::new(9));
        assert_eq!(b.decode(token.as_str()), Err(CodecError::InvalidToken));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec();
        let token = codec.encode(InternalId::new(5)).into_inner();
        let mut bytes = token.into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(codec.decode(&tampered), Err(CodecError::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec();
        assert_eq!(codec.decode(""), Err(CodecError::InvalidToken));
        assert_eq!(codec.decode("42"), Err(CodecError::InvalidToken));
        assert_eq!(codec.decode("not a token"), Err(CodecError::InvalidToken));
    }

    #[test]
    fn non_numeric_payload_is_format_error() {
        let key = IdCodec::generate_key();
        let codec = IdCodec::new(&key).unwrap();
        let raw = Fernet::new(&key).unwrap();
        for payload in [&b"abc"[..], b"-1", b"4.2", b""] {
            let token = raw.encrypt(payload);
            assert!(
                matches!(codec.decode(&token), Err(CodecError::Format(_))),
                "payload {payload:?}"
            );
        }
    }

    #[test]
    fn retired_key_still_decodes_but_is_not_used_to_encode() {
        let old_key = IdCodec::generate_key();
        let old = IdCodec::new(&old_key).unwrap();
        let issued = old.encode(InternalId::new(11));

        let new_key = IdCodec::generate_key();
        let rotated = IdCodec::with_retired(&new_key, &[old_key.as_str()]).unwrap();
        assert_eq!(rotated.decode(issued.as_str()).unwrap(), InternalId::new(11));

        let fresh = rotated.encode(InternalId::new(11));
        assert_eq!(old.decode(fresh.as_str()), Err(CodecError::InvalidToken));
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(matches!(IdCodec::new("short"), Err(CodecError::InvalidKey(_))));
        let good = IdCodec::generate_key();
        assert!(matches!(
            IdCodec::with_retired(&good, &["nope"]),
            Err(CodecError::InvalidKey(msg)) if msg.contains("retired[0]")
        ));
    }

    #[test]
    fn debug_redacts_keys() {
        let key = IdCodec::generate_key();
        let codec = IdCodec::new(&key).unwrap();
        let debug = format!("{codec:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(key.as_str()));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(raw in any::<u64>()) {
            let codec = codec();
            let token = codec.encode(InternalId::new(raw));
            prop_assert_eq!(codec.decode(token.as_str()).unwrap(), InternalId::new(raw));
        }
    }
}
