//! The ledger boundary. Treated as an opaque collaborator: transaction
//! observation (the mapping from a ledger write to a later
//! `(blockNumber, transactionNumber, anchorFileHash)` triple) is handled by
//! an external observer loop that lives outside this crate; the Rooter only
//! needs `getLastBlock`/`write`. [`ObservedTransaction`] is the shape that
//! observer loop hands back once it has resolved a write into ledger
//! context.

use async_trait::async_trait;

use crate::error::Result;

/// The most recently confirmed block, as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastBlock {
    /// Height of the most recently confirmed block.
    pub block_number: u64,
}

/// A ledger transaction as observed by the external watcher that feeds
/// operations to the DID State Projection. Not produced by anything in
/// this crate — defined here only because [`crate::operation::ResolvedTransaction`]
/// is shaped to carry exactly these fields once an observer has resolved
/// them.
#[derive(Debug, Clone)]
pub struct ObservedTransaction {
    /// Block the anchoring transaction landed in.
    pub block_number: u64,
    /// Ledger transaction number.
    pub transaction_number: u64,
    /// CAS hash of the anchor file this transaction committed.
    pub anchor_file_hash: String,
}

/// An append-only external ledger: `getLastBlock() -> {blockNumber}`,
/// `write(bytes)`.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Returns the most recently confirmed block.
    async fn get_last_block(&self) -> Result<LastBlock>;

    /// Anchors `bytes` (the anchor-file hash) in a new ledger transaction.
    async fn write(&self, bytes: Vec<u8>) -> Result<()>;
}
