//! Whitebox reconcile: level-triggered computation of desired dependents and status.
//!
//! [`reconcile`] wraps a [`Reconciler`] with the checks every pass needs: declared cardinality
//! is enforced on the observed dependents before the reconciler runs, events from an earlier
//! pass are dropped, and the desired state is checked against the observed one afterwards.
//! A reconciler must be idempotent: feeding its output back in yields the same output with
//! no new events.

#![forbid(unsafe_code)]

mod boundary;
mod phase;
mod plan;

use metrics::counter;
use tracing::{debug, warn};
use whitebox_core::{DependentDecl, Fault, ReconcileState};

pub use boundary::{check_dependents, validate_transition};
pub use phase::PhaseTracker;
pub use plan::{plan, Change, ObjectRef, Plan};

pub trait Reconciler {
    /// Dependent kinds owned by the parent, with their cardinality.
    fn dependents(&self) -> Vec<DependentDecl>;

    /// Turn the observed state into the desired state in place.
    fn reconcile(&self, state: &mut ReconcileState) -> Result<(), Fault>;
}

/// Run one reconcile pass.
pub fn reconcile<R: Reconciler + ?Sized>(reconciler: &R, mut state: ReconcileState) -> Result<ReconcileState, Fault> {
    let decls = reconciler.dependents();
    check_dependents(&state.dependents, &decls)?;

    let observed = state.clone();
    state.events.clear();
    reconciler.reconcile(&mut state)?;
    validate_transition(&observed, &state, &decls)?;

    state.events.retain(|ev| {
        if !ev.is_complete() {
            warn!(reason = %ev.reason, "dropping incomplete event");
        }
        ev.is_complete()
    });
    if !state.events.is_empty() {
        counter!("reconcile_events_total", state.events.len() as u64);
    }
    debug!(name = ?state.object.name(), events = state.events.len(), "reconcile pass complete");
    Ok(state)
}
