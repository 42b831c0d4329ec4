//! Admission payloads: request, response, and the domain outcomes that produce a response.

use serde::{Deserialize, Serialize};
use whitebox_patch::{EncodedPatch, PatchSet};

use crate::{Fault, Object};

/// The object as the client intends to write it. A document without `object` does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub object: Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    JsonPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionStatus {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<EncodedPatch>,
}

/// Validation outcome. A denial is a clean answer, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(String),
}

/// Mutation outcome. `Unchanged` is encoded as the absence of a patch, never as `[]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Unchanged,
    Patch(PatchSet),
}

impl AdmissionResponse {
    /// Validator acceptance: `{allowed: true, status: {reason: ""}}`.
    pub fn allowed() -> Self {
        Self { allowed: true, status: Some(AdmissionStatus::default()), patch_type: None, patch: None }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self { allowed: false, status: Some(AdmissionStatus { reason: reason.into() }), patch_type: None, patch: None }
    }

    pub fn from_verdict(v: Verdict) -> Self {
        match v {
            Verdict::Allow => Self::allowed(),
            Verdict::Deny(reason) => Self::denied(reason),
        }
    }

    /// Mutator answer; mutators always allow.
    pub fn from_mutation(m: Mutation) -> Result<Self, Fault> {
        let patch = match m {
            Mutation::Patch(set) if !set.is_empty() => Some(set.encode()?),
            _ => None,
        };
        Ok(Self { allowed: true, status: None, patch_type: patch.as_ref().map(|_| PatchType::JsonPatch), patch })
    }

    pub fn reason(&self) -> Option<&str> { self.status.as_ref().map(|s| s.reason.as_str()) }

    /// Decoded patch operations, if the response carries a patch.
    pub fn decoded_patch(&self) -> Result<Option<PatchSet>, Fault> {
        match &self.patch {
            None => Ok(None),
            Some(p) => Ok(Some(p.decode()?)),
        }
    }

    /// Enforce the response invariants: `patch` present iff `patchType` is JSONPatch, and a denial
    /// carries a non-empty reason and no patch.
    pub fn check(&self) -> Result<(), Fault> {
        if self.patch.is_some() != self.patch_type.is_some() {
            return Err(Fault::invalid("patchType", "patch and patchType must be set together"));
        }
        if !self.allowed {
            if self.reason().map_or(true, str::is_empty) {
                return Err(Fault::invalid("status.reason", "a denied response must carry a reason"));
            }
            if self.patch.is_some() {
                return Err(Fault::invalid("patch", "a denied response must not carry a patch"));
            }
        }
        Ok(())
    }
}
