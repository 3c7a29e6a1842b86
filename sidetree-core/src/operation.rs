//! The operation data model: raw client submissions, their resolved
//! ledger-transaction context, and the compact [`OperationInfo`] the
//! projection retains in memory.

use serde::{Deserialize, Serialize};

use crate::hash::{hash_create_payload, hash_operation_buffer, OperationHash};
use crate::timestamp::OperationTimestamp;

/// The tagged union of operation kinds a Sidetree-style DID supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// Establishes a new DID. The root of its version chain.
    Create,
    /// Applies a JSON patch to the current document.
    Update,
    /// Marks the DID as deactivated.
    Delete,
    /// Recovers control of a DID using a recovery key.
    Recover,
}

/// Ledger-resolution metadata attached to an operation once it has been
/// observed in an anchored batch. Fields are optional here because `apply`
/// is responsible for validating their presence (`Error::InvalidOperation`)
/// rather than the type system alone.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTransaction {
    /// Ledger block the anchoring transaction landed in.
    pub block_number: Option<u64>,
    /// Ledger transaction number.
    pub transaction_number: Option<u64>,
    /// Index of this operation within its batch file.
    pub operation_index: Option<u32>,
    /// CAS hash of the batch file this operation was packaged in.
    pub batch_file_hash: Option<String>,
    /// CAS hash of the anchor file committing that batch file. Recorded
    /// for future fork detection; not yet consumed by any read path.
    pub anchor_file_hash: Option<String>,
}

/// A client-submitted operation that has been resolved against the ledger.
#[derive(Debug, Clone)]
pub struct WriteOperation {
    /// Which of {Create, Update, Delete, Recover} this is.
    pub op_type: OperationType,
    /// The full raw bytes of the operation as it appears in the batch
    /// file. Hashed in its entirety for all non-`Create` operations.
    pub operation_buffer: Vec<u8>,
    /// The encoded payload carried by the operation. For `Create` this is
    /// what gets hashed into the `OperationHash`; for other types it is
    /// the patch/recovery payload, not independently hashed.
    pub encoded_payload: Vec<u8>,
    /// The version this operation builds on, absent only for `Create`.
    pub previous_operation_hash: Option<OperationHash>,
    /// Ledger-resolution metadata.
    pub transaction: ResolvedTransaction,
}

impl WriteOperation {
    /// Computes this operation's `OperationHash` under the given multihash
    /// algorithm code: `Create` hashes `encoded_payload`; everything else
    /// hashes the full `operation_buffer`.
    pub fn hash(&self, hash_algorithm_code: u64) -> OperationHash {
        match self.op_type {
            OperationType::Create => hash_create_payload(&self.encoded_payload, hash_algorithm_code),
            _ => hash_operation_buffer(&self.operation_buffer, hash_algorithm_code),
        }
    }
}

/// The wire encoding of an operation body as it is stored inside a batch
/// file payload: everything needed to reconstruct a [`WriteOperation`]
/// once its ledger-resolution metadata is known separately. The exact wire
/// encoding of an individual operation is really owned by the DID method,
/// not this crate — but something has to put bytes in the batch file, so
/// this is the minimal shape that carries what `apply`/`lookup` need.
#[derive(Serialize, Deserialize)]
struct EncodedOperation {
    op_type: OperationType,
    encoded_payload: Vec<u8>,
    previous_operation_hash: Option<OperationHash>,
}

/// Encodes an operation body for storage in a batch file.
pub fn encode_operation(op_type: OperationType, encoded_payload: &[u8], previous_operation_hash: Option<&str>) -> Vec<u8> {
    let encoded = EncodedOperation {
        op_type,
        encoded_payload: encoded_payload.to_vec(),
        previous_operation_hash: previous_operation_hash.map(|s| s.to_string()),
    };
    serde_json::to_vec(&encoded).expect("EncodedOperation serialization is infallible")
}

/// Decodes an operation body previously produced by [`encode_operation`].
pub fn decode_operation(buffer: &[u8]) -> crate::error::Result<(OperationType, Vec<u8>, Option<OperationHash>)> {
    let decoded: EncodedOperation =
        serde_json::from_slice(buffer).map_err(|_| crate::error::Error::MalformedBatchFile)?;
    Ok((decoded.op_type, decoded.encoded_payload, decoded.previous_operation_hash))
}

/// The projection's compressed record of an observed operation: enough to
/// lazily fetch the full operation from CAS, without retaining the
/// operation bytes themselves in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationInfo {
    /// CAS hash of the batch file the operation came from.
    pub batch_file_hash: String,
    /// CAS hash of the anchor file committing that batch, if known.
    pub anchor_file_hash: Option<String>,
    /// The operation's type.
    pub op_type: OperationType,
    /// Its position in ledger order.
    pub timestamp: OperationTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_op(payload: &[u8]) -> WriteOperation {
        WriteOperation {
            op_type: OperationType::Create,
            operation_buffer: payload.to_vec(),
            encoded_payload: payload.to_vec(),
            previous_operation_hash: None,
            transaction: ResolvedTransaction::default(),
        }
    }

    #[test]
    fn create_hash_depends_only_on_encoded_payload() {
        let mut op = create_op(b"payload");
        let h1 = op.hash(crate::hash::SHA2_256);
        op.operation_buffer = b"different wrapper bytes".to_vec();
        let h2 = op.hash(crate::hash::SHA2_256);
        assert_eq!(h1, h2);
    }

    #[test]
    fn update_hash_depends_on_full_buffer() {
        let mut op = create_op(b"payload");
        op.op_type = OperationType::Update;
        let h1 = op.hash(crate::hash::SHA2_256);
        op.operation_buffer = b"different wrapper bytes".to_vec();
        let h2 = op.hash(crate::hash::SHA2_256);
        assert_ne!(h1, h2);
    }
}
