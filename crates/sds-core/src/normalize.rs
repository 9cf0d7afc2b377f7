//! # Request Normalization
//!
//! Turns caller-supplied identifiers and checksums into the payloads sent
//! upstream. Tokens are decoded back to internal ids; the original token is
//! kept next to each decoded id so responses can echo it.
//!
//! Raw numeric identifiers are honoured only for trusted callers. For them
//! the normalizer mints the pair's token so downstream correlation works the
//! same way for both input forms.

use serde::Serialize;

use crate::codec::IdCodec;
use crate::error::CoreError;
use crate::id::{Checksum, ExternalToken, IdentifierInput, IdentityPair, InternalId};
use crate::trust::TrustLevel;

/// Default upper bound on the number of values in one batch list.
pub const DEFAULT_VALUE_LIMIT: usize = 100;

/// Single-record lookup as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsQuery {
    pub sds_id: Option<IdentifierInput>,
    pub pdf_md5: Option<String>,
    pub language_code: Option<String>,
}

/// Batch lookup as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchQuery {
    pub sds_id: Vec<IdentifierInput>,
    pub pdf_md5: Vec<String>,
}

/// Upstream body for single-record endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sds_id: Option<InternalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_md5: Option<Checksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Upstream body for batch endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPayload {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sds_id: Vec<InternalId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pdf_md5: Vec<Checksum>,
}

/// A normalized single-record lookup.
#[derive(Debug, Clone)]
pub struct NormalizedDetails {
    pub pair: Option<IdentityPair>,
    pub payload: DetailsPayload,
}

impl NormalizedDetails {
    /// The requested pair as a slice, for annotation.
    pub fn requested(&self) -> &[IdentityPair] {
        self.pair.as_slice()
    }
}

/// A normalized batch lookup.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub pairs: Vec<IdentityPair>,
    pub payload: BatchPayload,
}

/// Per-request normalizer.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    codec: &'a IdCodec,
    trust: TrustLevel,
    value_limit: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(codec: &'a IdCodec, trust: TrustLevel) -> Self {
        Self {
            codec,
            trust,
            value_limit: DEFAULT_VALUE_LIMIT,
        }
    }

    pub fn with_value_limit(mut self, value_limit: usize) -> Self {
        self.value_limit = value_limit;
        self
    }

    /// Decode one identifier. Empty input is treated as absent.
    pub fn normalize(&self, input: Option<&IdentifierInput>) -> Result<Option<IdentityPair>, CoreError> {
        match input {
            None => Ok(None),
            Some(IdentifierInput::Token(token)) if token.is_empty() => Ok(None),
            Some(IdentifierInput::Token(token)) => {
                let internal = self.codec.decode(token).map_err(|e| {
                    tracing::debug!(error = %e, "rejected identifier token");
                    CoreError::UnknownIdentifier("identifier token does not decode".into())
                })?;
                Ok(Some(IdentityPair {
                    internal,
                    external: ExternalToken::new(token.clone()),
                }))
            }
            Some(IdentifierInput::Raw(raw)) => {
                if !self.trust.is_trusted() {
                    tracing::debug!("rejected raw identifier from untrusted caller");
                    return Err(CoreError::UnknownIdentifier(
                        "raw numeric identifiers are not accepted".into(),
                    ));
                }
                let internal = InternalId::new(*raw);
                Ok(Some(IdentityPair {
                    internal,
                    external: self.codec.encode(internal),
                }))
            }
        }
    }

    /// Decode a batch of identifiers, preserving order.
    pub fn normalize_batch(&self, inputs: &[IdentifierInput]) -> Result<Vec<IdentityPair>, CoreError> {
        self.check_limit("sds_id", inputs.len())?;
        let mut pairs = Vec::with_capacity(inputs.len());
        for input in inputs {
            if let Some(pair) = self.normalize(Some(input))? {
                pairs.push(pair);
            }
        }
        Ok(pairs)
    }

    /// Validate a batch of checksums, preserving order and skipping empties.
    pub fn checksums(&self, raw: &[String]) -> Result<Vec<Checksum>, CoreError> {
        self.check_limit("pdf_md5", raw.len())?;
        raw.iter()
            .filter(|s| !s.is_empty())
            .map(|s| Checksum::parse(s))
            .collect()
    }

    /// Normalize a single-record lookup. At least one of identifier and
    /// checksum must be present.
    pub fn details(&self, query: &DetailsQuery) -> Result<NormalizedDetails, CoreError> {
        let pair = self.normalize(query.sds_id.as_ref())?;
        let pdf_md5 = match query.pdf_md5.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(Checksum::parse(raw)?),
        };
        if pair.is_none() && pdf_md5.is_none() {
            return Err(CoreError::MissingParameter);
        }
        let language_code = query.language_code.clone().filter(|s| !s.is_empty());
        Ok(NormalizedDetails {
            payload: DetailsPayload {
                sds_id: pair.as_ref().map(|p| p.internal),
                pdf_md5,
                language_code,
            },
            pair,
        })
    }

    /// Normalize a batch lookup. At least one list must be non-empty.
    pub fn batch(&self, query: &BatchQuery) -> Result<NormalizedBatch, CoreError> {
        let pairs = self.normalize_batch(&query.sds_id)?;
        let pdf_md5 = self.checksums(&query.pdf_md5)?;
        if pairs.is_empty() && pdf_md5.is_empty() {
            return Err(CoreError::MissingParameter);
        }
        Ok(NormalizedBatch {
            payload: BatchPayload {
                sds_id: pairs.iter().map(|p| p.internal).collect(),
                pdf_md5,
            },
            pairs,
        })
    }

    fn check_limit(&self, field: &'static str, len: usize) -> Result<(), CoreError> {
        if len > self.value_limit {
            return Err(CoreError::BatchTooLarge {
                field,
                limit: self.value_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MD5: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> IdCodec {
        IdCodec::new(&IdCodec::generate_key()).unwrap()
    }

    fn token(codec: &IdCodec, raw: u64) -> IdentifierInput {
        IdentifierInput::Token(codec.encode(InternalId::new(raw)).into_inner())
    }

    #[test]
    fn token_decodes_and_is_kept() {
        let codec = codec();
        let input = token(&codec, 42);
        let pair = Normalizer::new(&codec, TrustLevel::Untrusted)
            .normalize(Some(&input))
            .unwrap()
            .unwrap();
        assert_eq!(pair.internal, InternalId::new(42));
        assert_eq!(IdentifierInput::Token(pair.external.into_inner()), input);
    }

    #[test]
    fn absent_and_empty_inputs_are_none() {
        let codec = codec();
        let n = Normalizer::new(&codec, TrustLevel::Untrusted);
        assert_eq!(n.normalize(None).unwrap(), None);
        assert_eq!(n.normalize(Some(&IdentifierInput::Token(String::new()))).unwrap(), None);
    }

    #[test]
    fn foreign_token_is_unknown_identifier() {
        let codec = codec();
        let other = IdCodec::new(&IdCodec::generate_key()).unwrap();
        let input = token(&other, 1);
        let err = Normalizer::new(&codec, TrustLevel::Trusted)
            .normalize(Some(&input))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownIdentifier(_)));
    }

    #[test]
    fn raw_ids_require_trust() {
        let codec = codec();
        let raw = IdentifierInput::Raw(42);
        let err = Normalizer::new(&codec, TrustLevel::Untrusted)
            .normalize(Some(&raw))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownIdentifier(_)));

        let pair = Normalizer::new(&codec, TrustLevel::Trusted)
            .normalize(Some(&raw))
            .unwrap()
            .unwrap();
        assert_eq!(pair.internal, InternalId::new(42));
        assert_eq!(codec.decode(pair.external.as_str()).unwrap(), InternalId::new(42));
    }

    #[test]
    fn batch_preserves_order() {
        let codec = codec();
        let inputs: Vec<_> = [3, 1, 2].iter().map(|&r| token(&codec, r)).collect();
        let pairs = Normalizer::new(&codec, TrustLevel::Untrusted)
            .normalize_batch(&inputs)
            .unwrap();
        let ids: Vec<u64> = pairs.iter().map(|p| p.internal.get()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn batch_over_limit_names_limit() {
        let codec = codec();
        let inputs: Vec<_> = (0..4).map(|r| token(&codec, r)).collect();
        let n = Normalizer::new(&codec, TrustLevel::Untrusted).with_value_limit(3);
        let err = n.normalize_batch(&inputs).unwrap_err();
        assert_eq!(err, CoreError::BatchTooLarge { field: "sds_id", limit: 3 });
        assert!(err.to_string().contains('3'));

        assert!(n.normalize_batch(&inputs[..3]).is_ok());

        let sums = vec![MD5.to_string(); 4];
        assert_eq!(
            n.checksums(&sums).unwrap_err(),
            CoreError::BatchTooLarge { field: "pdf_md5", limit: 3 }
        );
    }

    #[test]
    fn default_limit_plus_one_fails() {
        let codec = codec();
        let inputs = vec![IdentifierInput::Raw(1); DEFAULT_VALUE_LIMIT + 1];
        let err = Normalizer::new(&codec, TrustLevel::Trusted)
            .normalize_batch(&inputs)
            .unwrap_err();
        assert!(err.to_string().contains(&DEFAULT_VALUE_LIMIT.to_string()));
    }

    #[test]
    fn details_requires_identifier_or_checksum() {
        let codec = codec();
        let n = Normalizer::new(&codec, TrustLevel::Untrusted);
        assert_eq!(
            n.details(&DetailsQuery::default()).unwrap_err(),
            CoreError::MissingParameter
        );
        let only_language = DetailsQuery {
            language_code: Some("en".into()),
            ..Default::default()
        };
        assert_eq!(n.details(&only_language).unwrap_err(), CoreError::MissingParameter);
    }

    #[test]
    fn details_by_checksum_builds_payload() {
        let codec = codec();
        let query = DetailsQuery {
            pdf_md5: Some(MD5.to_uppercase()),
            language_code: Some("en".into()),
            ..Default::default()
        };
        let normalized = Normalizer::new(&codec, TrustLevel::Untrusted)
            .details(&query)
            .unwrap();
        assert!(normalized.requested().is_empty());
        assert_eq!(
            serde_json::to_value(&normalized.payload).unwrap(),
            json!({"pdf_md5": MD5, "language_code": "en"})
        );
    }

    #[test]
    fn details_rejects_bad_checksum() {
        let codec = codec();
        let query = DetailsQuery {
            pdf_md5: Some(MD5[..31].to_string()),
            ..Default::default()
        };
        let err = Normalizer::new(&codec, TrustLevel::Untrusted)
            .details(&query)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownChecksum(_)));
    }

    #[test]
    fn batch_builds_payload_with_decoded_ids() {
        let codec = codec();
        let query = BatchQuery {
            sds_id: vec![token(&codec, 10), token(&codec, 20)],
            pdf_md5: vec![MD5.to_string()],
        };
        let normalized = Normalizer::new(&codec, TrustLevel::Untrusted)
            .batch(&query)
            .unwrap();
        assert_eq!(normalized.pairs.len(), 2);
        assert_eq!(
            serde_json::to_value(&normalized.payload).unwrap(),
            json!({"sds_id": [10, 20], "pdf_md5": [MD5]})
        );
    }

    #[test]
    fn empty_batch_is_missing_parameter() {
        let codec = codec();
        let err = Normalizer::new(&codec, TrustLevel::Untrusted)
            .batch(&BatchQuery::default())
            .unwrap_err();
        assert_eq!(err, CoreError::MissingParameter);
    }
}
