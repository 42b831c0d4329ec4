use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PatchError, PatchSet};

/// A patch in wire form: base64 of the minified JSON operation array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPatch(String);

impl EncodedPatch {
    pub fn encode(set: &PatchSet) -> Result<Self, PatchError> {
        // serde_json::to_vec never pretty-prints
        let raw = serde_json::to_vec(set)?;
        debug!(ops = set.len(), bytes = raw.len(), "encoded json patch");
        Ok(Self(STANDARD.encode(raw)))
    }

    pub fn decode(&self) -> Result<PatchSet, PatchError> {
        let raw = STANDARD.decode(self.0.as_bytes())?;
        Ok(serde_json::from_slice(&raw)?)
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl From<String> for EncodedPatch {
    fn from(s: String) -> Self { Self(s) }
}

impl std::fmt::Display for EncodedPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}
