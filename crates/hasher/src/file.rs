//! Whole-file and per-page SHA-256 hashing.
//!
//! These hashes operate on raw bytes, not canonicalized text: `file_hash`
//! identifies byte-identical source files regardless of what they contain,
//! and `per_page_hashes` identifies byte-identical pages of already
//! page-segmented, normalized text (as produced upstream by OCR or PDF text
//! extraction).

use std::io::Read;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HashingError;

/// Bytes read per chunk while streaming a file through SHA-256.
///
/// Keeping this bounded means hashing a multi-gigabyte PDF never holds more
/// than this many bytes in memory at once.
const STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// SHA-256 digest of one page's normalized text, identified by its
/// 1-indexed position in the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageHash {
    /// Page number, counting from 1.
    pub page_number: u32,
    /// Hex-encoded SHA-256 digest of the page's normalized text bytes.
    pub sha256_hex: String,
}

/// Compute the SHA-256 digest of a byte stream without buffering it whole.
///
/// `reader` is consumed in fixed-size chunks, so this is safe to call with a
/// file handle of arbitrary size.
pub fn file_hash(mut reader: impl Read) -> Result<String, HashingError> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; STREAM_CHUNK_BYTES];
    let mut total_read = 0usize;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total_read += n;
    }

    if total_read == 0 {
        return Err(HashingError::EmptyInput);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA-256 digest of an in-memory byte slice.
///
/// Equivalent to [`file_hash`] over a `&[u8]` reader, provided as a
/// convenience for callers that already hold the full file in memory.
pub fn file_hash_bytes(bytes: &[u8]) -> Result<String, HashingError> {
    if bytes.is_empty() {
        return Err(HashingError::EmptyInput);
    }
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Compute one SHA-256 digest per page of normalized text.
///
/// `pages` must already be split into per-page normalized text (e.g. one
/// entry per PDF page or OCR page). Empty pages are hashed like any other
/// input; an empty `pages` slice produces an empty result rather than an
/// error, since "no pages" is a valid state for a zero-page document.
pub fn per_page_hashes(pages: &[String]) -> Result<Vec<PageHash>, HashingError> {
    let mut out = Vec::with_capacity(pages.len());
    for (idx, page) in pages.iter().enumerate() {
        let mut hasher = Sha256::new();
        hasher.update(page.as_bytes());
        out.push(PageHash {
            page_number: (idx + 1) as u32,
            sha256_hex: hex::encode(hasher.finalize()),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_hash_deterministic() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let h1 = file_hash(&data[..]).expect("hash");
        let h2 = file_hash(&data[..]).expect("hash");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn file_hash_matches_bytes_variant() {
        let data = b"identical content, two call paths";
        let streamed = file_hash(&data[..]).expect("hash");
        let direct = file_hash_bytes(data).expect("hash");
        assert_eq!(streamed, direct);
    }

    #[test]
    fn file_hash_empty_input_rejected() {
        let data: &[u8] = &[];
        let res = file_hash(data);
        assert!(matches!(res, Err(HashingError::EmptyInput)));
    }

    #[test]
    fn file_hash_differs_on_single_byte_change() {
        let a = file_hash(&b"version a of the file"[..]).expect("hash");
        let b = file_hash(&b"version b of the file"[..]).expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn file_hash_spans_multiple_stream_chunks() {
        let data = vec![0x41u8; STREAM_CHUNK_BYTES * 3 + 17];
        let h1 = file_hash(&data[..]).expect("hash");
        let h2 = file_hash_bytes(&data).expect("hash");
        assert_eq!(h1, h2);
    }

    #[test]
    fn per_page_hashes_numbers_pages_from_one() {
        let pages = vec!["page one text".to_string(), "page two text".to_string()];
        let hashes = per_page_hashes(&pages).expect("hash");
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[0].page_number, 1);
        assert_eq!(hashes[1].page_number, 2);
        assert_ne!(hashes[0].sha256_hex, hashes[1].sha256_hex);
    }

    #[test]
    fn per_page_hashes_empty_document_is_empty_vec() {
        let pages: Vec<String> = vec![];
        let hashes = per_page_hashes(&pages).expect("hash");
        assert!(hashes.is_empty());
    }

    #[test]
    fn per_page_hashes_identical_pages_produce_identical_digests() {
        let pages = vec!["repeated boilerplate".to_string(); 3];
        let hashes = per_page_hashes(&pages).expect("hash");
        assert_eq!(hashes[0].sha256_hex, hashes[1].sha256_hex);
        assert_eq!(hashes[1].sha256_hex, hashes[2].sha256_hex);
    }
}
