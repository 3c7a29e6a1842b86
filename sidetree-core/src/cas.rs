//! The content-addressable store boundary. Treated as an opaque
//! collaborator — this crate only depends on the shape of `write`/`read`,
//! never on a concrete backing store.

use async_trait::async_trait;

use crate::error::Result;

/// A content-addressable store: `write(bytes) -> hash`, `read(hash) ->
/// bytes`. Implementations must make `write` deterministic and idempotent
/// on identical input, and `read` must fail with [`crate::Error::NotFound`]
/// for an unknown hash.
#[async_trait]
pub trait Cas: Send + Sync {
    /// Writes `bytes` to the store, returning its content hash.
    async fn write(&self, bytes: Vec<u8>) -> Result<String>;

    /// Reads the bytes addressed by `hash`.
    async fn read(&self, hash: &str) -> Result<Vec<u8>>;
}
