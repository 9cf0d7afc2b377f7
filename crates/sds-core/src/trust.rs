//! # Trust Resolution
//!
//! Decides, once per inbound request, whether the caller is a first-party
//! consumer allowed to see internal identifiers in their transparent form.
//! The resulting [`TrustLevel`] is threaded to every annotation made for
//! that request; it is never recomputed per record.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Disclosure level for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustLevel {
    /// First-party frontend or holder of the shared internal key.
    Trusted,
    /// Everyone else.
    Untrusted,
}

impl TrustLevel {
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Trusted)
    }
}

/// The shared internal API key that marks a caller as trusted.
///
/// Custom `Debug` implementation redacts the key.
#[derive(Clone)]
pub struct SharedKey(Zeroizing<String>);

impl SharedKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    /// Constant-time comparison against a presented key.
    ///
    /// When lengths differ, a dummy comparison keeps timing independent of
    /// the length match.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        if presented.len() != expected.len() {
            let _ = expected.ct_eq(expected);
            return false;
        }
        presented.ct_eq(expected).into()
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey([REDACTED])")
    }
}

/// Resolve the trust level of a request.
///
/// Trusted iff `frontend` is set or `presented` equals the configured shared
/// key. Without a configured key no caller is trusted through a key.
pub fn resolve(frontend: bool, presented: Option<&str>, expected: Option<&SharedKey>) -> TrustLevel {
    if frontend {
        return TrustLevel::Trusted;
    }
    match (presented, expected) {
        (Some(presented), Some(expected)) if expected.matches(presented) => TrustLevel::Trusted,
        _ => TrustLevel::Untrusted,
    }
}
