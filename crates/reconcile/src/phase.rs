use serde_json::Value;
use tracing::info;
use whitebox_core::{Event, Fault, ReconcileState};

/// One-way `status.phase` tracking.
///
/// Once the phase holds any non-empty value it is never touched again; only recreating the
/// object resets it. The optional event is emitted on the pass that sets the phase, and only then.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: &'static str,
    event: Option<Event>,
}

impl PhaseTracker {
    pub const fn new(phase: &'static str) -> Self { Self { phase, event: None } }

    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the phase if unset. Returns whether this pass set it.
    pub fn apply(&self, state: &mut ReconcileState) -> Result<bool, Fault> {
        let unset = match state.object.status_field("phase") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if !unset {
            return Ok(false);
        }
        state.object.status_mut()?.insert("phase".into(), Value::String(self.phase.to_string()));
        if let Some(ev) = &self.event {
            state.emit(ev.clone());
        }
        info!(name = ?state.object.name(), phase = self.phase, "phase set");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use whitebox_core::{Dependents, Object};

    fn state(status: Option<Value>) -> ReconcileState {
        let mut obj = Object::from_value(json!({ "metadata": { "name": "n" } })).unwrap();
        obj.status = status;
        ReconcileState::new(obj, Dependents::new())
    }

    #[test]
    fn sets_phase_once_with_event() {
        let tracker = PhaseTracker::new("completed").with_event(Event::normal("Completed", "done"));
        let mut st = state(None);
        assert!(tracker.apply(&mut st).unwrap());
        assert_eq!(st.object.status, Some(json!({ "phase": "completed" })));
        assert_eq!(st.events.len(), 1);

        st.events.clear();
        assert!(!tracker.apply(&mut st).unwrap());
        assert!(st.events.is_empty());
    }

    #[test]
    fn empty_phase_counts_as_unset() {
        let tracker = PhaseTracker::new("created");
        let mut st = state(Some(json!({ "phase": "" })));
        assert!(tracker.apply(&mut st).unwrap());
        assert_eq!(st.object.status_field("phase"), Some(&json!("created")));
    }

    #[test]
    fn any_other_phase_is_left_alone() {
        let tracker = PhaseTracker::new("completed");
        let mut st = state(Some(json!({ "phase": "failed", "message": "x" })));
        assert!(!tracker.apply(&mut st).unwrap());
        assert_eq!(st.object.status, Some(json!({ "phase": "failed", "message": "x" })));
    }
}
