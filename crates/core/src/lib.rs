//! Whitebox core types: the payloads exchanged between an external controller runtime and
//! short-lived hook processes (validate, mutate, reconcile).
//!
//! Every hook is a pure function from one request document to one response document.
//! Anything that prevents producing a well-formed response is a [`Fault`]; domain-level
//! outcomes ([`Verdict`], [`Mutation`]) are never faults.

#![forbid(unsafe_code)]

mod admission;
mod event;
mod fault;
mod key;
mod object;
mod state;

pub use admission::{AdmissionRequest, AdmissionResponse, AdmissionStatus, Mutation, PatchType, Verdict};
pub use event::{Event, EventType};
pub use fault::{Fault, Outcome};
pub use key::{Arity, Cardinality, DependentDecl, DependentKind, Many, One, ResourceKey};
pub use object::Object;
pub use state::{Dependents, ReconcileState, Slot, Vacant};

pub use kube::core::GroupVersionKind;
pub use whitebox_patch as patch;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse one request document. Anything that does not fit the payload type is a fault.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Fault> { serde_json::from_slice(bytes).map_err(Fault::Decode) }

/// Minified single-line JSON.
pub fn encode<T: Serialize>(v: &T) -> Result<Vec<u8>, Fault> { serde_json::to_vec(v).map_err(Fault::Encode) }

pub mod prelude {
    pub use super::{
        AdmissionRequest, AdmissionResponse, DependentKind, Dependents, Event, EventType, Fault, Many, Mutation, Object,
        One, Outcome, ReconcileState, ResourceKey, Slot, Verdict,
    };
}
