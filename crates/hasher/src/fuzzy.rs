//! Context-triggered piecewise hashing (CTPH), ssdeep-compatible.
//!
//! Exact content hashes only match byte-for-byte (after canonicalization)
//! identical text. Many near-duplicate documents in a real collection
//! differ by a paragraph, a stamped header, or a handful of OCR errors —
//! `fuzzy_hash` and [`fuzzy_compare`] exist to catch those.
//!
//! The algorithm follows Kornblum's spamsum/ssdeep design: the input is
//! split into content-defined chunks using a rolling hash (so insertions and
//! deletions only perturb the chunks adjacent to the edit, not the whole
//! signature), each chunk is folded into one base64-alphabet character via a
//! separate FNV-style accumulator, and two signatures are produced in the
//! same pass at block size `b` and `2b` so that documents of very different
//! sizes still have a comparable scale. Two signatures are only comparable
//! when their block sizes are equal or one is exactly double the other.

use crate::error::HashingError;

const ROLLING_WINDOW: usize = 7;
const MIN_BLOCKSIZE: u32 = 3;
const SPAMSUM_LENGTH: usize = 64;
const HASH_INIT: u32 = 0x2802_1967;
const FNV_PRIME: u32 = 0x0100_0193;
const B64_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Rolling hash over the trailing `ROLLING_WINDOW` bytes of the stream.
///
/// Ported from the spamsum rolling checksum: `h1` is a sum that ages out the
/// oldest byte in the window, `h2` weights more recent bytes more heavily,
/// and `h3` folds in byte order so that anagram-identical windows still
/// differ.
struct RollingHash {
    window: [u8; ROLLING_WINDOW],
    h1: u32,
    h2: u32,
    h3: u32,
    n: u32,
}

impl RollingHash {
    fn new() -> Self {
        Self {
            window: [0u8; ROLLING_WINDOW],
            h1: 0,
            h2: 0,
            h3: 0,
            n: 0,
        }
    }

    fn update(&mut self, byte: u8) -> u32 {
        let slot = (self.n as usize) % ROLLING_WINDOW;
        self.h2 = self.h2.wrapping_sub(self.h1);
        self.h2 = self
            .h2
            .wrapping_add((ROLLING_WINDOW as u32).wrapping_mul(byte as u32));
        self.h1 = self.h1.wrapping_add(byte as u32);
        self.h1 = self.h1.wrapping_sub(self.window[slot] as u32);
        self.window[slot] = byte;
        self.n = self.n.wrapping_add(1);
        self.h3 = (self.h3 << 5) ^ (byte as u32);
        self.h1.wrapping_add(self.h2).wrapping_add(self.h3)
    }
}

#[inline]
fn fnv_step(h: u32, byte: u8) -> u32 {
    h.wrapping_mul(FNV_PRIME) ^ (byte as u32)
}

#[inline]
fn b64_char(h: u32) -> u8 {
    B64_ALPHABET[(h as usize) % B64_ALPHABET.len()]
}

/// Block size to start trial-hashing at for an input of `len` bytes.
///
/// Doubles from `MIN_BLOCKSIZE` until the signature at that block size is
/// expected to fit within `SPAMSUM_LENGTH` characters.
fn initial_blocksize(len: usize) -> u32 {
    let mut bs = MIN_BLOCKSIZE;
    while (len as u64) / (bs as u64) > SPAMSUM_LENGTH as u64 {
        bs = bs.saturating_mul(2);
    }
    bs
}

/// Produce the two piecewise-hash signatures (at `block_size` and
/// `2 * block_size`) for `data` in a single pass.
fn spamsum_pass(data: &[u8], block_size: u32) -> (String, String) {
    let double_block_size = block_size.saturating_mul(2);
    let mut roll = RollingHash::new();
    let mut acc1 = HASH_INIT;
    let mut acc2 = HASH_INIT;
    let mut sig1 = String::with_capacity(SPAMSUM_LENGTH);
    let mut sig2 = String::with_capacity(SPAMSUM_LENGTH / 2);

    for &byte in data {
        acc1 = fnv_step(acc1, byte);
        acc2 = fnv_step(acc2, byte);
        let rh = roll.update(byte);

        if sig1.len() < SPAMSUM_LENGTH && rh % block_size == block_size - 1 {
            sig1.push(b64_char(acc1) as char);
            acc1 = HASH_INIT;
        }
        if sig2.len() < SPAMSUM_LENGTH / 2 && rh % double_block_size == double_block_size - 1 {
            sig2.push(b64_char(acc2) as char);
            acc2 = HASH_INIT;
        }
    }

    // A trailing partial chunk still contributes one final character,
    // matching ssdeep's end-of-input flush.
    if !data.is_empty() {
        if sig1.len() < SPAMSUM_LENGTH {
            sig1.push(b64_char(acc1) as char);
        }
        if sig2.len() < SPAMSUM_LENGTH / 2 {
            sig2.push(b64_char(acc2) as char);
        }
    }

    (sig1, sig2)
}

/// Compute an ssdeep-compatible fuzzy hash of `data`.
///
/// Returns a signature string of the form `"{block_size}:{sig1}:{sig2}"`.
/// Two signatures are only meaningfully comparable via [`fuzzy_compare`]
/// when their block sizes are equal or differ by exactly a factor of two.
pub fn fuzzy_hash(data: &[u8]) -> Result<String, HashingError> {
    if data.is_empty() {
        return Err(HashingError::EmptyInput);
    }

    let mut block_size = initial_blocksize(data.len());
    loop {
        let (sig1, sig2) = spamsum_pass(data, block_size);
        // If the primary signature came out too short, ssdeep halves the
        // block size and retries so shorter inputs still yield a signature
        // with useful resolution.
        if sig1.len() < SPAMSUM_LENGTH / 2 && block_size > MIN_BLOCKSIZE {
            block_size /= 2;
            continue;
        }
        return Ok(format!("{block_size}:{sig1}:{sig2}"));
    }
}

struct ParsedSignature {
    block_size: u32,
    sig1: String,
    sig2: String,
}

fn parse_signature(raw: &str) -> Result<ParsedSignature, HashingError> {
    let mut parts = raw.splitn(3, ':');
    let block_size = parts
        .next()
        .ok_or_else(|| HashingError::MalformedSignature(raw.to_string()))?
        .parse::<u32>()
        .map_err(|_| HashingError::MalformedSignature(raw.to_string()))?;
    let sig1 = parts
        .next()
        .ok_or_else(|| HashingError::MalformedSignature(raw.to_string()))?
        .to_string();
    let sig2 = parts
        .next()
        .ok_or_else(|| HashingError::MalformedSignature(raw.to_string()))?
        .to_string();
    Ok(ParsedSignature {
        block_size,
        sig1,
        sig2,
    })
}

/// Edit-distance-based similarity of two signature fragments, scaled to
/// `[0, 100]`. Identical fragments (including both empty) score 100.
fn fragment_score(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100;
    }
    let dist = levenshtein(a.as_bytes(), b.as_bytes());
    let scaled = (dist * 100) / max_len;
    100u8.saturating_sub(scaled.min(100) as u8)
}

/// Classic O(n*m) edit distance over bytes, sufficient for the short
/// (<=64 char) signature fragments compared here.
fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Compare two fuzzy-hash signatures and return a similarity score in
/// `[0, 100]`, where 100 means the two signatures are identical.
///
/// Signatures whose block sizes are not equal and not a factor of two apart
/// carry no comparable information at either scale; this returns
/// [`HashingError::IncomparableBlockSizes`] rather than a misleading 0.
pub fn fuzzy_compare(a: &str, b: &str) -> Result<u8, HashingError> {
    let a = parse_signature(a)?;
    let b = parse_signature(b)?;

    let (frag_a, frag_b) = if a.block_size == b.block_size {
        // Same scale: take the better-resolved of the two matching pairs.
        let at_bs = fragment_score(&a.sig1, &b.sig1);
        let at_2bs = fragment_score(&a.sig2, &b.sig2);
        return Ok(at_bs.max(at_2bs));
    } else if a.block_size == b.block_size.saturating_mul(2) {
        (a.sig1.as_str(), b.sig2.as_str())
    } else if b.block_size == a.block_size.saturating_mul(2) {
        (a.sig2.as_str(), b.sig1.as_str())
    } else {
        return Err(HashingError::IncomparableBlockSizes(
            a.block_size,
            b.block_size,
        ));
    };

    if frag_a.len() < ROLLING_WINDOW && frag_b.len() < ROLLING_WINDOW {
        return Ok(0);
    }

    Ok(fragment_score(frag_a, frag_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat_text(pattern: &str, times: usize) -> Vec<u8> {
        pattern.repeat(times).into_bytes()
    }

    #[test]
    fn fuzzy_hash_empty_input_rejected() {
        assert!(matches!(fuzzy_hash(&[]), Err(HashingError::EmptyInput)));
    }

    #[test]
    fn fuzzy_hash_deterministic() {
        let data = repeat_text("the quick brown fox jumps over the lazy dog. ", 200);
        let h1 = fuzzy_hash(&data).expect("hash");
        let h2 = fuzzy_hash(&data).expect("hash");
        assert_eq!(h1, h2);
    }

    #[test]
    fn fuzzy_hash_has_three_colon_separated_fields() {
        let data = repeat_text("some moderately long sample document body. ", 100);
        let sig = fuzzy_hash(&data).expect("hash");
        assert_eq!(sig.splitn(3, ':').count(), 3);
    }

    #[test]
    fn identical_inputs_compare_to_100() {
        let data = repeat_text("litigation exhibit narrative text block. ", 150);
        let sig = fuzzy_hash(&data).expect("hash");
        let score = fuzzy_compare(&sig, &sig).expect("compare");
        assert_eq!(score, 100);
    }

    #[test]
    fn near_duplicate_scores_high() {
        let base = "the committee reviewed the quarterly filing and approved the budget. "
            .repeat(120);
        let mut edited = base.clone();
        edited.push_str("one appended sentence changes little.");

        let sig_a = fuzzy_hash(base.as_bytes()).expect("hash a");
        let sig_b = fuzzy_hash(edited.as_bytes()).expect("hash b");
        let score = fuzzy_compare(&sig_a, &sig_b).expect("compare");
        assert!(score > 60, "expected high similarity, got {score}");
    }

    #[test]
    fn unrelated_inputs_score_low() {
        let a = "alpha beta gamma delta epsilon zeta eta theta. ".repeat(100);
        let b = "zulu yankee xray whiskey victor uniform tango sierra. ".repeat(100);
        let sig_a = fuzzy_hash(a.as_bytes()).expect("hash a");
        let sig_b = fuzzy_hash(b.as_bytes()).expect("hash b");
        let score = fuzzy_compare(&sig_a, &sig_b).expect("compare");
        assert!(score < 40, "expected low similarity, got {score}");
    }

    #[test]
    fn incompatible_block_sizes_are_rejected() {
        let res = fuzzy_compare("3:AAAA:BBBB", "7:CCCC:DDDD");
        assert!(matches!(
            res,
            Err(HashingError::IncomparableBlockSizes(3, 7))
        ));
    }

    #[test]
    fn malformed_signature_rejected() {
        let res = fuzzy_compare("not-a-signature", "3:AAAA:BBBB");
        assert!(matches!(res, Err(HashingError::MalformedSignature(_))));
    }

    #[test]
    fn levenshtein_matches_known_distances() {
        assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
        assert_eq!(levenshtein(b"", b"abc"), 3);
        assert_eq!(levenshtein(b"abc", b"abc"), 0);
    }

    #[test]
    fn initial_blocksize_grows_with_input_size() {
        assert!(initial_blocksize(100) <= initial_blocksize(1_000_000));
    }
}
