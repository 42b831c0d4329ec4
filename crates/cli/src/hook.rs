use tracing::{debug, warn};
use whitebox_admission::{mutate, validate};
use whitebox_controllers::Controller;
use whitebox_core::{decode, encode, AdmissionRequest, Fault, Object, ReconcileState};
use whitebox_reconcile::{plan, reconcile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Validate,
    Mutate,
    Reconcile,
    Plan,
}

fn check_resource(controller: &Controller, object: &Object) {
    if object.kind.is_empty() {
        return;
    }
    let expected = controller.resource.gvk();
    if object.gvk() != expected {
        warn!(controller = controller.name, api_version = %object.api_version, kind = %object.kind, expected = %expected.kind, "object is not this controller's resource");
    }
}

/// Run one hook over one request document and return the minified response.
pub fn invoke(hook: Hook, controller: &Controller, input: &[u8]) -> Result<Vec<u8>, Fault> {
    debug!(controller = controller.name, ?hook, bytes = input.len(), "invoking hook");
    match hook {
        Hook::Validate => {
            let req: AdmissionRequest = decode(input)?;
            check_resource(controller, &req.object);
            encode(&validate(controller.validator, &req)?)
        }
        Hook::Mutate => {
            let req: AdmissionRequest = decode(input)?;
            check_resource(controller, &req.object);
            encode(&mutate(controller.mutator, &req)?)
        }
        Hook::Reconcile => {
            let state: ReconcileState = decode(input)?;
            check_resource(controller, &state.object);
            encode(&reconcile(controller.reconciler, state)?)
        }
        Hook::Plan => {
            let observed: ReconcileState = decode(input)?;
            let desired = reconcile(controller.reconciler, observed.clone())?;
            encode(&plan(&observed, &desired)?)
        }
    }
}
