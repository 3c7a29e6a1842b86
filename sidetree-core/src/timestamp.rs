//! Operation ordering.
//!
//! The projection's linear order is lexicographic on `(transaction_number,
//! operation_index)`; `block_number` is carried for context and for
//! rollback's transaction-number cutoff, but does not itself participate in
//! ordering (two operations in the same block are still ordered by their
//! transaction number within it).

use serde::{Deserialize, Serialize};

/// `(blockNumber, transactionNumber, operationIndex)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperationTimestamp {
    /// Ledger block the anchoring transaction landed in.
    pub block_number: u64,
    /// Ledger transaction number, unique and monotonic across blocks.
    pub transaction_number: u64,
    /// Index of this operation within its batch file.
    pub operation_index: u32,
}

impl OperationTimestamp {
    /// The `(transaction_number, operation_index)` pair used for ordering.
    fn order_key(&self) -> (u64, u32) {
        (self.transaction_number, self.operation_index)
    }
}

impl PartialEq for OperationTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for OperationTimestamp {}

impl PartialOrd for OperationTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OperationTimestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}
