//! Error types for the **sidetree-core** crate.
//!
//! All fallible operations return [`crate::Result`], a thin alias over
//! `core::result::Result<T, Error>`. The variants mirror the error taxonomy
//! of the batching/anchoring pipeline and the DID state projection: most of
//! them are surfaced to callers as `None`/`undefined` at the public
//! resolve/lookup boundary rather than propagated, per the propagation
//! policy the projection follows.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// `apply` was called with a resolved operation missing required
    /// ledger metadata (block number, transaction number, operation index,
    /// or batch file hash). A caller contract violation, not a transient
    /// condition.
    #[error("invalid operation: missing resolved-transaction metadata")]
    InvalidOperation,

    /// A batch file buffer failed to decode.
    #[error("malformed batch file")]
    MalformedBatchFile,

    /// `get_operation_buffer` was called with an out-of-range index.
    #[error("operation index {index} out of range (batch has {len} operations)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of operations actually present.
        len: usize,
    },

    /// The content-addressable store is unreachable or returned an error.
    #[error("content-addressable store unavailable: {0}")]
    CasUnavailable(String),

    /// The hash was not found in the content-addressable store.
    #[error("not found in content-addressable store")]
    NotFound,

    /// The ledger is unreachable or returned an error.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// Operations were drained from the queue but could not be anchored.
    /// Never constructed by the happy path — see [`crate::rooter`]'s
    /// peek-then-commit dequeue, which is designed to make this
    /// unreachable in practice. Kept as a named failure mode because the
    /// design note in the source spec calls it out explicitly.
    #[error("operations lost before anchoring: {0} operations")]
    QueueLoss(usize),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
