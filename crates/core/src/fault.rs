use whitebox_patch::PatchError;

use crate::ResourceKey;

/// A fatal invocation fault: the hook cannot produce a response for this request.
///
/// Runtimes must not read a fault as "denied" or "no change"; the invocation failed.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("malformed request: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("invalid resource key `{0}`")]
    InvalidKey(String),
    #[error("dependents[{key}]: observed {found} objects, at most one is allowed")]
    TooManyDependents { key: ResourceKey, found: usize },
    #[error("invalid state transition: {0}")]
    Transition(String),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl Fault {
    pub fn missing(field: impl Into<String>) -> Self { Fault::MissingField(field.into()) }

    pub fn invalid(field: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Fault::InvalidField { field: field.into(), reason: reason.to_string() }
    }
}

/// Runtime-facing result of one hook invocation.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Faulted(Fault),
}

impl<T> Outcome<T> {
    /// Process exit status for this outcome: 0 on completion, 1 on fault.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed(_) => 0,
            Outcome::Faulted(_) => 1,
        }
    }

    pub fn is_fault(&self) -> bool { matches!(self, Outcome::Faulted(_)) }

    pub fn into_result(self) -> Result<T, Fault> {
        match self {
            Outcome::Completed(v) => Ok(v),
            Outcome::Faulted(f) => Err(f),
        }
    }
}

impl<T> From<Result<T, Fault>> for Outcome<T> {
    fn from(r: Result<T, Fault>) -> Self {
        match r {
            Ok(v) => Outcome::Completed(v),
            Err(f) => Outcome::Faulted(f),
        }
    }
}
