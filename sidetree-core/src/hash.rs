//! Multihash framing and the [`OperationHash`]/[`VersionId`] identifiers.
//!
//! An `OperationHash` is a Base58-encoded multihash: a varint hash-function
//! code, a varint digest length, then the raw digest bytes. The only code
//! this crate currently implements is SHA-256 (multihash code `0x12`, i.e.
//! `18`), selected per-block via the [`crate::protocol::ProtocolTable`].

use sha2::{Digest, Sha256};

/// Multihash code for SHA-256, per the multihash spec table.
pub const SHA2_256: u64 = 0x12;

/// A 32-byte digest produced by one of this crate's supported hash
/// algorithms. Distinct from [`OperationHash`], which is the Base58
/// multihash *encoding* of a digest like this one.
pub type Digest32 = [u8; 32];

/// Base58-encoded multihash. The sole identifier used throughout the
/// projection; also aliased as [`VersionId`] when it names a DID-document
/// version rather than an operation.
pub type OperationHash = String;

/// Alias of [`OperationHash`]: identifies a specific DID-document revision
/// produced by the operation of the same hash.
pub type VersionId = OperationHash;

/// Hashes `bytes` with the algorithm named by `hash_algorithm_code`,
/// returning the raw digest (not yet multihash-framed or Base58-encoded).
///
/// Only [`SHA2_256`] is implemented; any other code is treated as SHA-256
/// as well, since the Protocol Table is the sole place new codes would be
/// introduced and none have been to date.
fn digest(bytes: &[u8], _hash_algorithm_code: u64) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut d = [0u8; 32];
    d.copy_from_slice(&out[..32]);
    d
}

/// Frames a digest as a multihash: `varint(code) || varint(len) || digest`.
/// Crate-visible so the Merkle tree can fold the framed form at every level
/// instead of combining bare digests.
pub(crate) fn multihash_frame(hash_algorithm_code: u64, digest: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(digest.len() + 4);
    let mut code_buf = unsigned_varint::encode::u64_buffer();
    buf.extend_from_slice(unsigned_varint::encode::u64(hash_algorithm_code, &mut code_buf));
    let mut len_buf = unsigned_varint::encode::u64_buffer();
    buf.extend_from_slice(unsigned_varint::encode::u64(digest.len() as u64, &mut len_buf));
    buf.extend_from_slice(digest);
    buf
}

/// Computes the Base58 multihash of `bytes` using the given hash algorithm
/// code. This is the general-purpose primitive; [`hash_create_payload`] and
/// [`hash_operation_buffer`] apply the operation-type-specific rule from the
/// data model (Create hashes the encoded payload, everything else hashes
/// the full operation buffer).
pub fn multihash(bytes: &[u8], hash_algorithm_code: u64) -> OperationHash {
    let d = digest(bytes, hash_algorithm_code);
    bs58::encode(multihash_frame(hash_algorithm_code, &d)).into_string()
}

/// Hashes a `Create` operation's encoded payload into its `OperationHash`.
pub fn hash_create_payload(encoded_payload: &[u8], hash_algorithm_code: u64) -> OperationHash {
    multihash(encoded_payload, hash_algorithm_code)
}

/// Hashes a non-`Create` operation's full byte buffer into its
/// `OperationHash`.
pub fn hash_operation_buffer(operation_buffer: &[u8], hash_algorithm_code: u64) -> OperationHash {
    multihash(operation_buffer, hash_algorithm_code)
}

/// Encodes an already-computed digest (e.g. a Merkle root) as a Base58
/// multihash, without re-hashing it. Use [`multihash`] instead when `bytes`
/// is the *input* to be hashed, not a digest that already exists.
pub fn frame_digest(digest: &Digest32, hash_algorithm_code: u64) -> OperationHash {
    bs58::encode(multihash_frame(hash_algorithm_code, digest)).into_string()
}

/// Hashes `bytes` with the algorithm named by `hash_algorithm_code`, exposed
/// outside this module for the Merkle tree, which needs the bare digest
/// before it frames each leaf/node as a multihash.
pub fn digest_bytes_of(bytes: &[u8], hash_algorithm_code: u64) -> Digest32 {
    digest(bytes, hash_algorithm_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multihash_is_deterministic() {
        let a = multihash(b"hello", SHA2_256);
        let b = multihash(b"hello", SHA2_256);
        assert_eq!(a, b);
    }

    #[test]
    fn multihash_differs_by_input() {
        let a = multihash(b"hello", SHA2_256);
        let b = multihash(b"world", SHA2_256);
        assert_ne!(a, b);
    }

    #[test]
    fn multihash_round_trips_through_base58() {
        let encoded = multihash(b"payload", SHA2_256);
        let decoded = bs58::decode(&encoded).into_vec().expect("valid base58");
        assert_eq!(decoded[0], SHA2_256 as u8);
        assert_eq!(decoded[1], 32);
        assert_eq!(decoded.len(), 34);
    }
}
