//! Anchor file: the small CAS artifact committing `{batchFileHash,
//! merkleRoot}`, serialized canonically so the anchor file's own CAS hash
//! is deterministic across equal inputs.

use serde::{Deserialize, Serialize};

/// `{batchFileHash, merkleRoot}`. Field order is fixed by declaration order
/// here and preserved by `serde_json` (which does not reorder struct
/// fields), so two anchor files built from the same inputs serialize to
/// byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorFile {
    #[serde(rename = "batchFileHash")]
    pub batch_file_hash: String,
    #[serde(rename = "merkleRoot")]
    pub merkle_root: String,
}

impl AnchorFile {
    /// Builds a new anchor file.
    pub fn new(batch_file_hash: String, merkle_root: String) -> Self {
        Self {
            batch_file_hash,
            merkle_root,
        }
    }

    /// Canonical serialization: no whitespace variance, fixed field order.
    pub fn to_buffer(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("AnchorFile serialization is infallible")
    }

    /// Decodes an anchor file from its canonical serialization.
    pub fn from_buffer(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}
