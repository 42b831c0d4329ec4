//! Whitebox admission: validate and mutate hooks over a proposed object write.
//!
//! Validation walks an ordered rule list and stops at the first failure, so a denial always
//! carries exactly one reason. Mutation walks an ordered list of field rules and accumulates
//! every needed correction into one JSON Patch; each rule sees the document as patched by the
//! rules before it.

#![forbid(unsafe_code)]

mod defaults;
mod rules;

use metrics::counter;
use tracing::{debug, info};
use whitebox_core::{AdmissionRequest, AdmissionResponse, Fault, Mutation, Object, Verdict};

pub use defaults::{Defaults, FieldRule};
pub use rules::Rules;

/// Decides whether a proposed write is acceptable.
pub trait Validator {
    fn validate(&self, object: &Object) -> Result<Verdict, Fault>;
}

/// Computes the corrections a proposed write needs. Mutators never reject.
pub trait Mutator {
    fn mutate(&self, object: &Object) -> Result<Mutation, Fault>;
}

/// Run a validator against one admission request.
pub fn validate<V: Validator + ?Sized>(validator: &V, req: &AdmissionRequest) -> Result<AdmissionResponse, Fault> {
    let verdict = validator.validate(&req.object)?;
    match &verdict {
        Verdict::Allow => debug!(name = ?req.object.name(), "admission allowed"),
        Verdict::Deny(reason) => {
            counter!("admission_denied_total", 1u64);
            info!(name = ?req.object.name(), reason = %reason, "admission denied");
        }
    }
    Ok(AdmissionResponse::from_verdict(verdict))
}

/// Run a mutator against one admission request.
pub fn mutate<M: Mutator + ?Sized>(mutator: &M, req: &AdmissionRequest) -> Result<AdmissionResponse, Fault> {
    let mutation = mutator.mutate(&req.object)?;
    if let Mutation::Patch(set) = &mutation {
        counter!("admission_patched_total", 1u64);
        debug!(name = ?req.object.name(), ops = set.len(), "admission patch computed");
    }
    AdmissionResponse::from_mutation(mutation)
}
