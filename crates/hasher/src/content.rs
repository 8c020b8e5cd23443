//! Content hashing: the canonical-text identity hash used for exact-duplicate
//! detection across documents with different bytes but identical meaning.
//!
//! This module does not implement its own normalization. It delegates
//! entirely to [`canonical::canonicalize`], so a content hash is only ever
//! as strong as the canonicalization config it was produced with, and two
//! documents normalized under different [`CanonicalizeConfig`] versions are
//! never comparable (see `canonical`'s version-discriminated hash preimage).

use canonical::{canonicalize, CanonicalizeConfig};

use crate::error::HashingError;

/// Canonicalize `text` and return its version-aware SHA-256 identity hash.
///
/// `doc_id` only affects the returned [`canonical::CanonicalizedDocument`]
/// metadata, not the hash itself — `content_hash` depends solely on the
/// canonical text and `cfg.version`.
pub fn content_hash(
    doc_id: impl Into<String>,
    text: &str,
    cfg: &CanonicalizeConfig,
) -> Result<String, HashingError> {
    let doc = canonicalize(doc_id, text, cfg)?;
    Ok(doc.sha256_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_stable_across_whitespace_differences() {
        let cfg = CanonicalizeConfig::default();
        let a = content_hash("doc-a", "Hello   World", &cfg).expect("hash a");
        let b = content_hash("doc-b", "hello world", &cfg).expect("hash b");
        assert_eq!(a, b);
    }

    #[test]
    fn content_hash_differs_on_different_config_version() {
        let cfg_v1 = CanonicalizeConfig::default();
        let cfg_v2 = CanonicalizeConfig {
            version: 2,
            ..CanonicalizeConfig::default()
        };
        let a = content_hash("doc", "same text", &cfg_v1).expect("hash v1");
        let b = content_hash("doc", "same text", &cfg_v2).expect("hash v2");
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_propagates_canonical_errors() {
        let cfg = CanonicalizeConfig::default();
        let res = content_hash("doc", "   ", &cfg);
        assert!(matches!(res, Err(HashingError::Canonical(_))));
    }
}
