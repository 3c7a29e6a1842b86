//! Demo CLI wiring `sidetree-core`'s Rooter and DID State Projection
//! against simple filesystem-backed CAS/ledger adapters.
//!
//! The content-addressable store and the ledger are both opaque external
//! collaborators from the library's point of view, and the real observer
//! loop that feeds resolved operations to the projection normally lives
//! outside this crate entirely. `replay_projection` below stands in for
//! that observer by reading the local ledger log directly, rather than
//! subscribing to transaction events from a real chain. Because each
//! subcommand is its own process, the Rooter's pending queue is persisted
//! as a directory of sequence-numbered files between `submit` and `tick`
//! invocations — `Rooter` itself only ever holds the queue in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use sidetree_core::anchor_file::AnchorFile;
use sidetree_core::batch_file::BatchFile;
use sidetree_core::cas::Cas;
use sidetree_core::config::{ProjectionConfig, RooterConfig};
use sidetree_core::did_document::IdentityDocumentPatcher;
use sidetree_core::error::{Error, Result};
use sidetree_core::hash::SHA2_256;
use sidetree_core::ledger::{LastBlock, Ledger, ObservedTransaction};
use sidetree_core::operation::{decode_operation, ResolvedTransaction, WriteOperation};
use sidetree_core::projection::DidStateProjection;
use sidetree_core::protocol::ProtocolTable;
use sidetree_core::rooter::Rooter;

#[derive(Parser)]
#[command(name = "sidetree-node")]
#[command(about = "Demo runner for the sidetree-core batching/anchoring pipeline and DID projection", version)]
struct Cli {
    /// Directory holding the local CAS blob store, ledger log, and
    /// pending-operation queue.
    #[arg(long, default_value = "./sidetree-state")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue each given operation file without running a tick.
    Submit {
        /// Paths to files containing pre-encoded operation bytes, in the
        /// format produced by `sidetree_core::operation::encode_operation`.
        files: Vec<PathBuf>,
    },
    /// Run one pipeline tick over whatever is currently queued.
    Tick,
    /// Replay every anchored batch and resolve a DID from its genesis
    /// `Create` operation hash.
    Resolve {
        /// The `VersionId` of the DID's genesis `Create` operation.
        did_unique_portion: String,
    },
    /// Replay every anchored batch and print the document at one specific
    /// `VersionId`, rather than walking to the chain tip.
    Lookup {
        /// The `VersionId` (operation hash) of the version to print.
        version_id: String,
    },
}

struct FsCas {
    dir: PathBuf,
}

impl FsCas {
    fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, hash: &str) -> PathBuf {
        self.dir.join(hash)
    }
}

#[async_trait]
impl Cas for FsCas {
    async fn write(&self, bytes: Vec<u8>) -> Result<String> {
        let hash = sidetree_core::hash::multihash(&bytes, SHA2_256);
        fs::write(self.path_for(&hash), &bytes).map_err(|e| Error::CasUnavailable(e.to_string()))?;
        Ok(hash)
    }

    async fn read(&self, hash: &str) -> Result<Vec<u8>> {
        fs::read(self.path_for(hash)).map_err(|_| Error::NotFound)
    }
}

/// A ledger backed by a local append-only log of anchor-file hashes, one
/// per line. The line number doubles as the block number: each write is
/// its own block, for simplicity.
struct FileLedger {
    log_path: PathBuf,
}

impl FileLedger {
    fn new(path: PathBuf) -> std::io::Result<Self> {
        if !path.exists() {
            fs::write(&path, b"")?;
        }
        Ok(Self { log_path: path })
    }

    fn read_lines(&self) -> std::io::Result<Vec<String>> {
        let contents = fs::read_to_string(&self.log_path)?;
        Ok(contents.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    /// Resolves the local log into the transactions an observer loop would
    /// have reported: each line is its own block, so the block number and
    /// transaction number both equal the line's 1-based position.
    fn observed_transactions(&self) -> std::io::Result<Vec<ObservedTransaction>> {
        Ok(self
            .read_lines()?
            .into_iter()
            .enumerate()
            .map(|(i, anchor_file_hash)| ObservedTransaction {
                block_number: (i + 1) as u64,
                transaction_number: (i + 1) as u64,
                anchor_file_hash,
            })
            .collect())
    }
}

#[async_trait]
impl Ledger for FileLedger {
    async fn get_last_block(&self) -> Result<LastBlock> {
        let lines = self.read_lines().map_err(|e| Error::LedgerUnavailable(e.to_string()))?;
        Ok(LastBlock {
            block_number: lines.len() as u64,
        })
    }

    async fn write(&self, bytes: Vec<u8>) -> Result<()> {
        let hash = String::from_utf8(bytes).map_err(|e| Error::LedgerUnavailable(e.to_string()))?;
        let mut contents = fs::read_to_string(&self.log_path).unwrap_or_default();
        contents.push_str(&hash);
        contents.push('\n');
        fs::write(&self.log_path, contents).map_err(|e| Error::LedgerUnavailable(e.to_string()))
    }
}

/// The Rooter's pending queue, persisted across process invocations as a
/// directory of sequence-numbered files. `submit` appends to it; `tick`
/// loads it in FIFO order, feeds it into an in-memory `Rooter`, and
/// deletes whatever the tick actually drained.
struct PendingQueue {
    dir: PathBuf,
}

impl PendingQueue {
    fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entries(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)?.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        entries.sort();
        Ok(entries)
    }

    fn push(&self, bytes: &[u8]) -> std::io::Result<()> {
        // Sequence numbers must never be reused once assigned: a tick can
        // drain the lowest-numbered entries and leave higher-numbered ones
        // behind, so the next index has to come from the highest name seen
        // so far, not from how many files currently remain.
        let next_index = self
            .entries()?
            .iter()
            .filter_map(|p| p.file_name()?.to_str()?.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1);
        fs::write(self.dir.join(format!("{next_index:012}")), bytes)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let cas_dir = cli.state_dir.join("cas");
    let ledger_path = cli.state_dir.join("ledger.log");
    let queue_dir = cli.state_dir.join("pending");

    match cli.command {
        Commands::Submit { files } => submit(&queue_dir, files),
        Commands::Tick => tick(&cas_dir, &ledger_path, &queue_dir).await,
        Commands::Resolve { did_unique_portion } => {
            let projection = replay_projection(&cas_dir, &ledger_path).await;
            let tip = projection.last(&did_unique_portion);
            print_document(projection.lookup(&tip).await)
        }
        Commands::Lookup { version_id } => {
            let projection = replay_projection(&cas_dir, &ledger_path).await;
            print_document(projection.lookup(&version_id).await)
        }
    }
}

fn print_document(doc: Option<sidetree_core::did_document::DidDocument>) {
    match doc {
        Some(doc) => println!("{}", serde_json::to_string_pretty(&doc.content).unwrap()),
        None => println!("version not found"),
    }
}

fn submit(queue_dir: &Path, files: Vec<PathBuf>) {
    let queue = PendingQueue::new(queue_dir.to_path_buf()).expect("pending queue dir");
    for file in &files {
        let bytes = fs::read(file).unwrap_or_else(|e| panic!("reading {}: {e}", file.display()));
        queue.push(&bytes).expect("writing pending queue entry");
    }
    println!("queued {} operations", files.len());
}

async fn tick(cas_dir: &Path, ledger_path: &Path, queue_dir: &Path) {
    let cas = Arc::new(FsCas::new(cas_dir.to_path_buf()).expect("cas dir"));
    let ledger = Arc::new(FileLedger::new(ledger_path.to_path_buf()).expect("ledger log"));
    let queue = PendingQueue::new(queue_dir.to_path_buf()).expect("pending queue dir");
    let rooter = Rooter::new(cas, ledger, ProtocolTable::default(), RooterConfig::default());

    let pending_files = queue.entries().expect("reading pending queue");
    for path in &pending_files {
        rooter.add(fs::read(path).expect("reading pending queue entry"));
    }

    rooter.root_operations().await;

    let remaining = rooter.get_operation_queue_length();
    let drained = pending_files.len() - remaining;
    for path in pending_files.iter().take(drained) {
        fs::remove_file(path).expect("removing anchored pending entry");
    }

    println!("anchored {drained} operations, {remaining} remain pending");
}

/// Replays every anchored batch in the ledger log into a fresh
/// projection, the way the observer loop that normally feeds
/// `DidStateProjection::apply` would.
async fn replay_projection(cas_dir: &Path, ledger_path: &Path) -> DidStateProjection {
    let cas = Arc::new(FsCas::new(cas_dir.to_path_buf()).expect("cas dir"));
    let ledger = FileLedger::new(ledger_path.to_path_buf()).expect("ledger log");
    let transactions = ledger.observed_transactions().expect("reading ledger log");

    let mut projection = DidStateProjection::new(
        cas.clone(),
        Arc::new(IdentityDocumentPatcher),
        ProtocolTable::default(),
        ProjectionConfig::default(),
    );

    for transaction in &transactions {
        let anchor_bytes = cas.read(&transaction.anchor_file_hash).await.expect("anchor file present");
        let anchor = AnchorFile::from_buffer(&anchor_bytes).expect("valid anchor file");
        let batch_bytes = cas.read(&anchor.batch_file_hash).await.expect("batch file present");
        let batch = BatchFile::from_buffer(&batch_bytes).expect("valid batch file");

        for index in 0..batch.len() {
            let buffer = batch.get_operation_buffer(index).expect("index in range");
            let (op_type, encoded_payload, previous_operation_hash) = decode_operation(buffer).expect("valid operation");
            let op = WriteOperation {
                op_type,
                operation_buffer: buffer.to_vec(),
                encoded_payload,
                previous_operation_hash,
                transaction: ResolvedTransaction {
                    block_number: Some(transaction.block_number),
                    transaction_number: Some(transaction.transaction_number),
                    operation_index: Some(index as u32),
                    batch_file_hash: Some(anchor.batch_file_hash.clone()),
                    anchor_file_hash: Some(transaction.anchor_file_hash.clone()),
                },
            };
            projection.apply(&op).expect("resolved operation carries full metadata");
        }
    }

    projection
}
