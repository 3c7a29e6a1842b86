//! DID State Projection: the in-memory, rollback-capable projection of
//! DID-document state built by replaying operations observed on the
//! ledger.
//!
//! Holds exactly two maps — `op_info_by_hash` and `chosen_next` — and
//! reconstructs full operations lazily from CAS rather than retaining their
//! bytes. `lookup` walks the predecessor chain with an explicit stack
//! instead of recursion, since a deep version chain would otherwise risk
//! exhausting the call stack; it accumulates the document forward from the
//! genesis instead.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::batch_file::BatchFile;
use crate::cas::Cas;
use crate::config::ProjectionConfig;
use crate::did_document::{document_update, DidDocument, DocumentPatcher};
use crate::error::{Error, Result};
use crate::hash::{OperationHash, VersionId};
use crate::operation::{decode_operation, OperationInfo, OperationType, ResolvedTransaction, WriteOperation};
use crate::protocol::ProtocolTable;
use crate::timestamp::OperationTimestamp;

/// The in-memory DID state projection.
pub struct DidStateProjection {
    op_info_by_hash: HashMap<OperationHash, OperationInfo>,
    chosen_next: HashMap<VersionId, VersionId>,
    cas: Arc<dyn Cas>,
    patcher: Arc<dyn DocumentPatcher>,
    protocol_table: ProtocolTable,
    config: ProjectionConfig,
    last_processed_transaction: Option<u64>,
}

impl DidStateProjection {
    /// Builds an empty projection.
    pub fn new(cas: Arc<dyn Cas>, patcher: Arc<dyn DocumentPatcher>, protocol_table: ProtocolTable, config: ProjectionConfig) -> Self {
        Self {
            op_info_by_hash: HashMap::new(),
            chosen_next: HashMap::new(),
            cas,
            patcher,
            protocol_table,
            config,
            last_processed_transaction: None,
        }
    }

    /// Returns the compact record stored for `hash`, if any operation
    /// with that hash has been applied (and not since rolled back).
    pub fn operation_info(&self, hash: &OperationHash) -> Option<&OperationInfo> {
        self.op_info_by_hash.get(hash)
    }

    /// The highest transaction number fully applied so far, across both
    /// winning and duplicate-losing arrivals (an observer that has
    /// delivered everything through this transaction number has nothing
    /// left to catch this projection up on).
    pub fn last_processed_transaction(&self) -> Option<u64> {
        self.last_processed_transaction
    }

    /// Applies a resolved operation. Returns the operation's hash on
    /// success, or `None` if it lost the duplicate-resolution race.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if `op.transaction` is missing
    /// any of `block_number`, `transaction_number`, `operation_index`, or
    /// `batch_file_hash`.
    pub fn apply(&mut self, op: &WriteOperation) -> Result<Option<OperationHash>> {
        let block_number = op.transaction.block_number.ok_or(Error::InvalidOperation)?;
        let transaction_number = op.transaction.transaction_number.ok_or(Error::InvalidOperation)?;
        let operation_index = op.transaction.operation_index.ok_or(Error::InvalidOperation)?;
        let batch_file_hash = op
            .transaction
            .batch_file_hash
            .clone()
            .ok_or(Error::InvalidOperation)?;

        self.last_processed_transaction = Some(
            self.last_processed_transaction
                .map_or(transaction_number, |prev| prev.max(transaction_number)),
        );

        let hash_algorithm_code = self.protocol_table.get_protocol(block_number).hash_algorithm_code;
        let h = op.hash(hash_algorithm_code);

        let timestamp = OperationTimestamp {
            block_number,
            transaction_number,
            operation_index,
        };
        let info = OperationInfo {
            batch_file_hash,
            anchor_file_hash: op.transaction.anchor_file_hash.clone(),
            op_type: op.op_type,
            timestamp,
        };

        if let Some(existing) = self.op_info_by_hash.get(&h) {
            if existing.timestamp < info.timestamp {
                debug!(hash = %h, "duplicate operation arrival lost timestamp race");
                return Ok(None);
            }
        }
        self.op_info_by_hash.insert(h.clone(), info.clone());

        if let Some(prev) = &op.previous_operation_hash {
            let should_replace = match self.chosen_next.get(prev) {
                None => true,
                Some(current_next) => {
                    let current_info = self.op_info_by_hash.get(current_next);
                    current_info.map(|ci| ci.timestamp >= info.timestamp).unwrap_or(true)
                }
            };
            if should_replace {
                self.chosen_next.insert(prev.clone(), h.clone());
            }
        }

        Ok(Some(h))
    }

    /// Removes every operation (and every `chosen_next` entry pointing to
    /// one) with `timestamp.transaction_number >= transaction_number`.
    /// Prunes `chosen_next` before `op_info_by_hash`, since the former's
    /// pruning decision reads the latter.
    pub fn rollback(&mut self, transaction_number: u64) {
        let op_info_by_hash = &self.op_info_by_hash;
        self.chosen_next.retain(|_, next_hash| {
            op_info_by_hash
                .get(next_hash)
                .map(|info| info.timestamp.transaction_number < transaction_number)
                .unwrap_or(false)
        });
        self.op_info_by_hash
            .retain(|_, info| info.timestamp.transaction_number < transaction_number);

        if let Some(last) = self.last_processed_transaction {
            if last >= transaction_number {
                self.last_processed_transaction = transaction_number.checked_sub(1);
            }
        }
        debug!(transaction_number, "rolled back projection state");
    }

    /// `resolve(x) = lookup(last(x))`: resolves a DID from the `VersionId`
    /// of its genesis `Create` operation.
    pub async fn resolve(&self, did_unique_portion: &str) -> Option<DidDocument> {
        let tip = self.last(did_unique_portion);
        self.lookup(&tip).await
    }

    /// Reconstructs the DID document at version `v`, folding operations
    /// forward from the genesis `Create`. Returns `None` if `v` is unknown
    /// or any ancestor in its chain is unresolvable (rolled back, or a CAS
    /// failure).
    pub async fn lookup(&self, v: &VersionId) -> Option<DidDocument> {
        if !self.op_info_by_hash.contains_key(v) {
            return None;
        }

        let mut chain = Vec::new();
        let mut current = v.clone();
        loop {
            let info = self.op_info_by_hash.get(&current)?.clone();
            let op = self.get_operation(&info).await?;
            let prev = op.previous_operation_hash.clone();
            chain.push((current.clone(), op));
            match prev {
                None => break,
                Some(p) => current = p,
            }
        }
        chain.reverse();

        let genesis_version_id = &chain[0].0;
        let did = format!("{}:{}", self.config.did_method_name, genesis_version_id);

        let mut doc: Option<DidDocument> = None;
        for (_, op) in chain {
            doc = document_update(doc.as_ref(), &op, &did, self.patcher.as_ref());
            doc.as_ref()?;
        }
        doc
    }

    /// Returns the predecessor version of `v`, or `None` if `v` is a
    /// `Create` (a chain root) or unresolvable.
    pub async fn previous(&self, v: &VersionId) -> Option<VersionId> {
        let info = self.op_info_by_hash.get(v)?.clone();
        let op = self.get_operation(&info).await?;
        op.previous_operation_hash
    }

    /// Walks `previous` back to the chain root, returning the earliest
    /// known `VersionId`. Fails immediately if `v` itself is unknown.
    pub async fn first(&self, v: &VersionId) -> Option<VersionId> {
        if !self.op_info_by_hash.contains_key(v) {
            return None;
        }
        let mut current = v.clone();
        loop {
            match self.previous(&current).await {
                Some(p) => current = p,
                None => return Some(current),
            }
        }
    }

    /// Direct lookup of the chosen successor of `v`, with no CAS read.
    pub fn next(&self, v: &VersionId) -> Option<VersionId> {
        self.chosen_next.get(v).cloned()
    }

    /// Walks `next` forward to the most recent version, with no CAS read.
    pub fn last(&self, v: &str) -> VersionId {
        let mut current = v.to_string();
        while let Some(next) = self.next(&current) {
            current = next;
        }
        current
    }

    /// Reconstructs the full [`WriteOperation`] named by `info` by reading
    /// its batch file from CAS and decoding the operation at its recorded
    /// index. Returns `None` on any CAS or decode failure — these are
    /// "version unresolvable" conditions at this crate's public boundary,
    /// not propagated errors.
    async fn get_operation(&self, info: &OperationInfo) -> Option<WriteOperation> {
        let batch_bytes = self.cas.read(&info.batch_file_hash).await.ok()?;
        let batch = BatchFile::from_buffer(&batch_bytes).ok()?;
        let op_buffer = batch.get_operation_buffer(info.timestamp.operation_index as usize).ok()?;
        let (op_type, encoded_payload, previous_operation_hash) = decode_operation(op_buffer).ok()?;
        debug_assert_eq!(op_type, info.op_type);
        Some(WriteOperation {
            op_type,
            operation_buffer: op_buffer.to_vec(),
            encoded_payload,
            previous_operation_hash,
            transaction: ResolvedTransaction {
                block_number: Some(info.timestamp.block_number),
                transaction_number: Some(info.timestamp.transaction_number),
                operation_index: Some(info.timestamp.operation_index),
                batch_file_hash: Some(info.batch_file_hash.clone()),
                anchor_file_hash: info.anchor_file_hash.clone(),
            },
        })
    }
}
