//! Merkle commitment over an ordered, non-empty sequence of operation
//! payloads.
//!
//! Leaf values are the chosen multihash of each payload, not a bare digest:
//! every node carries its algorithm code and length alongside the digest
//! bytes, so two trees built under different hash algorithms can never
//! collide on the same root by coincidence of digest bytes alone. Internal
//! nodes hash the concatenation of their two children's multihashes, then
//! are themselves framed as a multihash before going up a level. Odd levels
//! duplicate the last node before pairing, the standard Bitcoin-style
//! convention.

use crate::hash::{digest_bytes_of, multihash_frame, Digest32};

/// Computes the Merkle root over `payloads` using the hash algorithm named
/// by `hash_algorithm_code`. The returned digest is the bare digest of the
/// top node; callers that need it framed as a multihash (e.g. to embed in
/// an anchor file) apply [`crate::hash::frame_digest`] themselves.
///
/// # Panics
///
/// Panics if `payloads` is empty. An empty batch must never reach this
/// component — the Rooter guards against it before committing a tick.
pub fn merkle_root(payloads: &[Vec<u8>], hash_algorithm_code: u64) -> Digest32 {
    assert!(!payloads.is_empty(), "merkle_root called with no payloads");

    let mut level: Vec<Vec<u8>> = payloads
        .iter()
        .map(|p| multihash_frame(hash_algorithm_code, &digest_bytes_of(p, hash_algorithm_code)))
        .collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level.last().unwrap().clone();
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut combined = Vec::with_capacity(pair[0].len() + pair[1].len());
                combined.extend_from_slice(&pair[0]);
                combined.extend_from_slice(&pair[1]);
                multihash_frame(hash_algorithm_code, &digest_bytes_of(&combined, hash_algorithm_code))
            })
            .collect();
    }

    let top = &level[0];
    let mut root = [0u8; 32];
    root.copy_from_slice(&top[top.len() - 32..]);
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::SHA2_256;

    #[test]
    fn single_leaf_root_is_its_own_digest() {
        let root = merkle_root(&[b"solo".to_vec()], SHA2_256);
        let expected = digest_bytes_of(b"solo", SHA2_256);
        assert_eq!(root, expected);
    }

    #[test]
    fn leaf_value_is_framed_as_multihash_not_bare_digest() {
        // Two distinct algorithm codes framing the same bare digest must
        // not collapse to the same root, which a combine step over bare
        // digests alone would miss.
        let one_leaf_root = merkle_root(&[b"a".to_vec(), b"b".to_vec()], SHA2_256);
        let d0 = digest_bytes_of(b"a", SHA2_256);
        let d1 = digest_bytes_of(b"b", SHA2_256);
        let framed0 = multihash_frame(SHA2_256, &d0);
        let framed1 = multihash_frame(SHA2_256, &d1);
        let mut combined = Vec::new();
        combined.extend_from_slice(&framed0);
        combined.extend_from_slice(&framed1);
        let expected = digest_bytes_of(&combined, SHA2_256);
        assert_eq!(one_leaf_root, expected);
    }

    #[test]
    fn deterministic_across_runs() {
        let payloads = vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        let r1 = merkle_root(&payloads, SHA2_256);
        let r2 = merkle_root(&payloads, SHA2_256);
        assert_eq!(r1, r2);
    }

    #[test]
    fn odd_count_duplicates_last_leaf() {
        let payloads = vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        let odd_root = merkle_root(&payloads, SHA2_256);

        let framed = |bytes: &[u8]| multihash_frame(SHA2_256, &digest_bytes_of(bytes, SHA2_256));
        let f0 = framed(b"a");
        let f1 = framed(b"b");
        let f2 = framed(b"c");
        let mut left = Vec::new();
        left.extend_from_slice(&f0);
        left.extend_from_slice(&f1);
        let left_parent = framed(&left);
        let mut right = Vec::new();
        right.extend_from_slice(&f2);
        right.extend_from_slice(&f2);
        let right_parent = framed(&right);
        let mut top = Vec::new();
        top.extend_from_slice(&left_parent);
        top.extend_from_slice(&right_parent);
        let expected = digest_bytes_of(&top, SHA2_256);

        assert_eq!(odd_root, expected);
    }

    #[test]
    fn order_sensitive() {
        let a = merkle_root(&[b"a".to_vec(), b"b".to_vec()], SHA2_256);
        let b = merkle_root(&[b"b".to_vec(), b"a".to_vec()], SHA2_256);
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic]
    fn empty_payloads_panics() {
        merkle_root(&[], SHA2_256);
    }
}
