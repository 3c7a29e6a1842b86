//! The DID-document boundary.
//!
//! The JSON patch operator that actually interprets a DID method's document
//! schema is owned by that method, not by this crate: the Projection only
//! needs something that turns a `Create` payload into a genesis document and
//! folds an `Update`/`Delete`/`Recover` operation into a prior document.
//! [`DocumentPatcher`] is that seam; [`IdentityDocumentPatcher`] is a
//! minimal stand-in sufficient to exercise the Projection's traversal logic
//! in tests — not a real JSON Patch (RFC 6902) engine.

use serde_json::Value;

use crate::operation::{OperationType, WriteOperation};

/// A resolved DID document: the method-qualified DID plus its current
/// content.
#[derive(Debug, Clone, PartialEq)]
pub struct DidDocument {
    /// Fully qualified DID, e.g. `did:sidetree:<uniquePortion>`.
    pub did: String,
    /// Document content. Left as an open JSON value since its schema is
    /// owned by the DID method, not this crate.
    pub content: Value,
}

/// Folds operations into DID documents. Implementations own the actual
/// patch semantics; this crate only calls through the seam.
pub trait DocumentPatcher: Send + Sync {
    /// Builds the genesis document for a DID from a `Create` operation's
    /// encoded payload. Returns `None` if the payload cannot be
    /// interpreted as a document.
    fn apply_create(&self, did: &str, encoded_payload: &[u8]) -> Option<Value>;

    /// Folds a non-`Create` operation into the prior document, producing
    /// the next version's content.
    fn apply_update(&self, previous: &Value, op: &WriteOperation) -> Value;
}

/// Builds the document for `op`, given the already-resolved document at
/// its previous version (`None` only when `op` is itself a `Create`).
pub fn document_update(previous: Option<&DidDocument>, op: &WriteOperation, did: &str, patcher: &dyn DocumentPatcher) -> Option<DidDocument> {
    match op.op_type {
        OperationType::Create => patcher.apply_create(did, &op.encoded_payload).map(|content| DidDocument {
            did: did.to_string(),
            content,
        }),
        OperationType::Update | OperationType::Delete | OperationType::Recover => {
            let previous = previous?;
            Some(DidDocument {
                did: did.to_string(),
                content: patcher.apply_update(&previous.content, op),
            })
        }
    }
}

/// A pass-through patcher: `Create` payloads are parsed as JSON verbatim,
/// `Update`/`Recover` payloads replace the document content wholesale, and
/// `Delete` stamps `{"deactivated": true}` onto the existing content. Good
/// enough to drive the Projection's traversal in tests; not a substitute
/// for a real JSON Patch implementation.
#[derive(Debug, Default)]
pub struct IdentityDocumentPatcher;

impl DocumentPatcher for IdentityDocumentPatcher {
    fn apply_create(&self, _did: &str, encoded_payload: &[u8]) -> Option<Value> {
        serde_json::from_slice(encoded_payload).ok()
    }

    fn apply_update(&self, previous: &Value, op: &WriteOperation) -> Value {
        match op.op_type {
            OperationType::Delete => {
                let mut content = previous.clone();
                if let Value::Object(map) = &mut content {
                    map.insert("deactivated".to_string(), Value::Bool(true));
                }
                content
            }
            _ => serde_json::from_slice(&op.encoded_payload).unwrap_or_else(|_| previous.clone()),
        }
    }
}
