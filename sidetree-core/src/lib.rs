//! sidetree-core: the batching/anchoring pipeline and DID state projection
//! at the heart of a Sidetree-style Layer-2 identity node.
//!
//! Two cooperating subsystems live here:
//!
//! * [`rooter`] — batches client-submitted operations, writes them to a
//!   content-addressable store, and anchors a Merkle commitment on an
//!   external ledger.
//! * [`projection`] — replays operations observed on that ledger into an
//!   in-memory, rollback-capable view of DID-document state.
//!
//! The content-addressable store and ledger themselves ([`cas::Cas`],
//! [`ledger::Ledger`]) are consumed as opaque traits; this crate never
//! depends on a concrete backing implementation.

pub mod anchor_file;
pub mod batch_file;
pub mod cas;
pub mod config;
pub mod did_document;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod merkle;
pub mod operation;
pub mod protocol;
pub mod rooter;
pub mod projection;
pub mod timestamp;

pub use error::{Error, Result};
pub use hash::{OperationHash, VersionId};
pub use projection::DidStateProjection;
pub use rooter::Rooter;
