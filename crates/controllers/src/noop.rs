//! `Noop`: owns nothing. Marks itself annotated on admission and `completed` on first reconcile.

use serde::Deserialize;
use serde_json::{json, Value};
use whitebox_admission::{Defaults, FieldRule, Mutator, Rules, Validator};
use whitebox_core::{DependentDecl, Event, Fault, Mutation, Object, ReconcileState, Verdict};
use whitebox_reconcile::{PhaseTracker, Reconciler};

use crate::ResourceType;

pub const RESOURCE: ResourceType = ResourceType::new("whitebox.summerwind.dev", "v1alpha1", "Noop");

/// Annotation the mutator pins to `"true"`.
pub const ANNOTATION: &str = "noop";
pub const PHASE_COMPLETED: &str = "completed";

/// `data` is free-form; only an empty string is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoopSpec {
    #[serde(default)]
    pub data: Option<Value>,
}

pub struct Noop;

impl Validator for Noop {
    fn validate(&self, object: &Object) -> Result<Verdict, Fault> {
        let spec = object.spec_as::<NoopSpec>()?;
        Ok(Rules::<Option<NoopSpec>>::new()
            .rule("'spec' is empty", |s| s.is_some())
            .rule("'spec.data' is empty", |s| s.as_ref().and_then(|s| s.data.as_ref()).and_then(Value::as_str) != Some(""))
            .evaluate(&spec))
    }
}

impl Mutator for Noop {
    fn mutate(&self, object: &Object) -> Result<Mutation, Fault> {
        Defaults::new()
            .field(
                FieldRule::at(&["metadata", "annotations", ANNOTATION])
                    .or_insert(json!("true"))
                    .replace_if(|v: &Value| v != "true", json!("true")),
            )
            .evaluate(object)
    }
}

impl Reconciler for Noop {
    fn dependents(&self) -> Vec<DependentDecl> { Vec::new() }

    fn reconcile(&self, state: &mut ReconcileState) -> Result<(), Fault> {
        PhaseTracker::new(PHASE_COMPLETED)
            .with_event(Event::normal("Completed", "reconciliation completed"))
            .apply(state)?;
        Ok(())
    }
}
