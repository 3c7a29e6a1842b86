//! Batch file: a self-describing, deterministic encoding of an ordered
//! sequence of raw operation payloads.
//!
//! Wire format: a 4-byte little-endian operation count, followed by that
//! many `(4-byte little-endian length, payload bytes)` records. Simple,
//! length-prefixed, and self-delimiting — the exact encoding doesn't matter
//! beyond that, as long as it round-trips byte-for-byte, which this does by
//! construction.

use crate::error::{Error, Result};

/// A self-describing CAS artifact wrapping an ordered, non-empty* sequence
/// of raw operation payloads.
///
/// (*The codec itself tolerates an empty sequence; the Rooter is the
/// component that guarantees one never reaches CAS.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    operations: Vec<Vec<u8>>,
}

impl BatchFile {
    /// Builds a batch file from an ordered sequence of raw operation
    /// payloads.
    pub fn from_operations(operations: Vec<Vec<u8>>) -> Self {
        Self { operations }
    }

    /// Decodes a batch file from its wire encoding.
    pub fn from_buffer(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::MalformedBatchFile);
        }
        let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut operations = Vec::with_capacity(count);
        let mut cursor = 4usize;
        for _ in 0..count {
            if cursor + 4 > bytes.len() {
                return Err(Error::MalformedBatchFile);
            }
            let len = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            if cursor + len > bytes.len() {
                return Err(Error::MalformedBatchFile);
            }
            operations.push(bytes[cursor..cursor + len].to_vec());
            cursor += len;
        }
        if cursor != bytes.len() {
            return Err(Error::MalformedBatchFile);
        }
        Ok(Self { operations })
    }

    /// Serializes this batch file to its wire encoding. Deterministic:
    /// equal `operations` sequences yield byte-equal output, which is what
    /// makes CAS addressing of the batch file stable.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.operations.len() as u32).to_le_bytes());
        for op in &self.operations {
            buf.extend_from_slice(&(op.len() as u32).to_le_bytes());
            buf.extend_from_slice(op);
        }
        buf
    }

    /// Returns the raw payload at index `i`.
    pub fn get_operation_buffer(&self, i: usize) -> Result<&[u8]> {
        self.operations.get(i).map(Vec::as_slice).ok_or(Error::IndexOutOfRange {
            index: i,
            len: self.operations.len(),
        })
    }

    /// The number of operations packaged in this batch file.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether this batch file contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Borrows the underlying ordered payloads, e.g. for Merkle commitment.
    pub fn operations(&self) -> &[Vec<u8>] {
        &self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_individual_payloads() {
        let ops = vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()];
        let batch = BatchFile::from_operations(ops.clone());
        let bytes = batch.to_buffer();
        let decoded = BatchFile::from_buffer(&bytes).expect("decodes");
        for (i, expected) in ops.iter().enumerate() {
            assert_eq!(decoded.get_operation_buffer(i).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn to_buffer_is_deterministic() {
        let ops = vec![b"x".to_vec(), b"y".to_vec()];
        let a = BatchFile::from_operations(ops.clone()).to_buffer();
        let b = BatchFile::from_operations(ops).to_buffer();
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_index_errors() {
        let batch = BatchFile::from_operations(vec![b"only".to_vec()]);
        let err = batch.get_operation_buffer(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn truncated_buffer_is_malformed() {
        let ops = vec![b"hello".to_vec()];
        let mut bytes = BatchFile::from_operations(ops).to_buffer();
        bytes.truncate(bytes.len() - 2);
        let err = BatchFile::from_buffer(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedBatchFile));
    }

    #[test]
    fn empty_batch_round_trips() {
        let batch = BatchFile::from_operations(vec![]);
        let bytes = batch.to_buffer();
        let decoded = BatchFile::from_buffer(&bytes).expect("decodes");
        assert!(decoded.is_empty());
    }
}
