//! Rooter: the batching & anchoring pipeline. Enqueues submitted operation
//! payloads; on a periodic tick assembles a batch, writes a batch file to
//! CAS, writes an anchor file (referencing the batch hash and Merkle root)
//! to CAS, then writes the anchor-file hash to the ledger.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use crate::anchor_file::AnchorFile;
use crate::batch_file::BatchFile;
use crate::cas::Cas;
use crate::config::RooterConfig;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::merkle::merkle_root;
use crate::protocol::ProtocolTable;

/// Releases the `processing` interlock when dropped, on every exit path —
/// success, empty batch, or error — so a tick that returns early or panics
/// can never leave the pipeline permanently stuck refusing future ticks.
struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        // compare_exchange(false -> true): only one tick can hold the
        // guard at a time, coalescing any tick that arrives while one is
        // already in flight.
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The batching & anchoring pipeline.
///
/// `add` may be called at any time; `root_operations` is the pipeline
/// tick. The pending queue is drained from the head in FIFO order and
/// undrained operations remain queued across ticks.
pub struct Rooter {
    queue: Mutex<VecDeque<Vec<u8>>>,
    processing: AtomicBool,
    cas: Arc<dyn Cas>,
    ledger: Arc<dyn Ledger>,
    protocol_table: ProtocolTable,
    config: RooterConfig,
}

impl Rooter {
    /// Builds a new Rooter with an empty queue.
    pub fn new(cas: Arc<dyn Cas>, ledger: Arc<dyn Ledger>, protocol_table: ProtocolTable, config: RooterConfig) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            processing: AtomicBool::new(false),
            cas,
            ledger,
            protocol_table,
            config,
        })
    }

    /// Appends a raw operation payload to the tail of the pending queue.
    /// O(1); no size bound is enforced here — overflow policy belongs to
    /// the surrounding system.
    pub fn add(&self, op: Vec<u8>) {
        self.queue.lock().unwrap().push_back(op);
    }

    /// The number of operations currently queued, awaiting a tick.
    pub fn get_operation_queue_length(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Spawns a background task that calls [`Rooter::root_operations`] at
    /// a fixed wall-clock interval, per `config.batch_interval_seconds`.
    /// Returns the task handle so callers can abort it.
    pub fn start_periodic_rooting(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let rooter = Arc::clone(self);
        let interval = Duration::from_secs_f64(rooter.config.batch_interval_seconds);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                rooter.root_operations().await;
            }
        })
    }

    /// One pipeline tick. Coalesces with any tick already in flight;
    /// drains up to the current protocol's `max_operations_per_batch` from
    /// the queue head, and if that yields a non-empty batch, writes the
    /// batch file and anchor file to CAS and the anchor-file hash to the
    /// ledger. Any failure after the batch is drained leaves the drained
    /// operations un-dequeued — see [`Rooter::try_root_operations`] — so a
    /// retried tick on the next interval picks them back up instead of
    /// losing them to a partially-failed anchoring attempt.
    pub async fn root_operations(&self) {
        let _guard = match ProcessingGuard::acquire(&self.processing) {
            Some(guard) => guard,
            None => return,
        };

        if let Err(err) = self.try_root_operations().await {
            warn!(error = %err, "pipeline tick failed; operations remain queued for the next tick");
        }
    }

    async fn try_root_operations(&self) -> Result<()> {
        let last_block = self.ledger.get_last_block().await?;
        let params = self.protocol_table.get_protocol(last_block.block_number + 1);

        let drain_count = {
            let queue = self.queue.lock().unwrap();
            queue.len().min(params.max_operations_per_batch as usize)
        };
        if drain_count == 0 {
            return Ok(());
        }

        let batch_payloads: Vec<Vec<u8>> = {
            let queue = self.queue.lock().unwrap();
            queue.iter().take(drain_count).cloned().collect()
        };

        let batch = BatchFile::from_operations(batch_payloads.clone());
        let batch_buffer = batch.to_buffer();
        let batch_file_hash = self.cas.write(batch_buffer).await?;

        let root = merkle_root(&batch_payloads, params.hash_algorithm_code);
        let merkle_root_hash = crate::hash::frame_digest(&root, params.hash_algorithm_code);

        let anchor = AnchorFile::new(batch_file_hash.clone(), merkle_root_hash);
        let anchor_buffer = anchor.to_buffer();
        let anchor_file_hash = self.cas.write(anchor_buffer).await?;

        self.ledger.write(anchor_file_hash.clone().into_bytes()).await?;

        // Only now, after the ledger write is acknowledged, commit the
        // dequeue. Draining before the anchor is confirmed would lose
        // these operations for good if any CAS or ledger call above failed.
        {
            let mut queue = self.queue.lock().unwrap();
            for _ in 0..drain_count {
                queue.pop_front();
            }
        }

        info!(
            batch_size = drain_count,
            %batch_file_hash,
            %anchor_file_hash,
            "rooted batch"
        );
        Ok(())
    }
}
