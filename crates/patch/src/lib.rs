//! Whitebox patch: the JSON Patch (RFC-6902) codec shared by admission hooks and runtimes.
//!
//! A [`PatchSet`] is an ordered list of operations. Each operation is applied against the
//! document as mutated by the operations before it. On the wire a patch travels as the
//! minified JSON array, base64-encoded ([`EncodedPatch`]).

#![forbid(unsafe_code)]

mod codec;
mod summary;

use json_patch::{AddOperation, PatchOperation, RemoveOperation, ReplaceOperation};
use jsonptr::PointerBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

pub use codec::EncodedPatch;
pub use summary::{diff_summary, DiffSummary};

pub mod prelude {
    pub use super::{pointer, DiffSummary, EncodedPatch, PatchError, PatchSet};
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("patch is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("patch is not a JSON Patch document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("patch does not apply: {0}")]
    Apply(#[from] json_patch::PatchError),
}

/// Build a JSON Pointer from unescaped reference tokens (`["metadata", "annotations", "a/b"]`).
pub fn pointer<'a, I>(tokens: I) -> PointerBuf
where
    I: IntoIterator<Item = &'a str>,
{
    PointerBuf::from_tokens(tokens)
}

/// Ordered JSON Patch operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet(SmallVec<[PatchOperation; 4]>);

impl PatchSet {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn ops(&self) -> &[PatchOperation] { &self.0 }

    pub fn push(&mut self, op: PatchOperation) -> &mut Self {
        self.0.push(op);
        self
    }

    pub fn add(&mut self, path: PointerBuf, value: Value) -> &mut Self {
        self.push(PatchOperation::Add(AddOperation { path, value }))
    }

    pub fn replace(&mut self, path: PointerBuf, value: Value) -> &mut Self {
        self.push(PatchOperation::Replace(ReplaceOperation { path, value }))
    }

    pub fn remove(&mut self, path: PointerBuf) -> &mut Self {
        self.push(PatchOperation::Remove(RemoveOperation { path }))
    }

    /// Apply all operations in order. On error `doc` may be partially patched.
    pub fn apply(&self, doc: &mut Value) -> Result<(), PatchError> {
        json_patch::patch(doc, &self.0)?;
        Ok(())
    }

    /// Minified JSON array, base64-encoded.
    pub fn encode(&self) -> Result<EncodedPatch, PatchError> {
        EncodedPatch::encode(self)
    }

    pub fn decode(encoded: &str) -> Result<Self, PatchError> {
        EncodedPatch::from(encoded.to_string()).decode()
    }
}

impl From<Vec<PatchOperation>> for PatchSet {
    fn from(ops: Vec<PatchOperation>) -> Self { Self(SmallVec::from_vec(ops)) }
}

impl From<json_patch::Patch> for PatchSet {
    fn from(patch: json_patch::Patch) -> Self { Self::from(patch.0) }
}

impl Extend<PatchOperation> for PatchSet {
    fn extend<I: IntoIterator<Item = PatchOperation>>(&mut self, iter: I) { self.0.extend(iter) }
}

impl IntoIterator for PatchSet {
    type Item = PatchOperation;
    type IntoIter = smallvec::IntoIter<[PatchOperation; 4]>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}
