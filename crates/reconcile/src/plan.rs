//! Desired-vs-observed comparison: what a runtime would create, update and delete.

use std::collections::BTreeMap;

use serde::Serialize;
use whitebox_core::{Fault, Object, ReconcileState, ResourceKey};
use whitebox_patch::{diff_summary, DiffSummary};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ObjectRef {
    pub key: ResourceKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    #[serde(flatten)]
    pub target: ObjectRef,
    pub summary: DiffSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    /// Field-level changes to the parent (status included), when it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<DiffSummary>,
    pub created: Vec<ObjectRef>,
    pub updated: Vec<Change>,
    pub deleted: Vec<ObjectRef>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.parent.is_none() && self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

fn index(state: &ReconcileState) -> Result<BTreeMap<ObjectRef, &Object>, Fault> {
    let mut out = BTreeMap::new();
    for (key, items) in state.dependents.iter() {
        for (i, obj) in items.iter().enumerate() {
            let name = obj.name().ok_or_else(|| Fault::missing(format!("dependents[{}][{}].metadata.name", key, i)))?;
            let r = ObjectRef { key: key.clone(), namespace: obj.namespace().map(str::to_string), name: name.to_string() };
            out.insert(r, obj);
        }
    }
    Ok(out)
}

/// Compare the desired state a reconciler returned with the observed state it was given.
pub fn plan(observed: &ReconcileState, desired: &ReconcileState) -> Result<Plan, Fault> {
    let before = index(observed)?;
    let after = index(desired)?;
    let mut p = Plan::default();

    if observed.object != desired.object {
        p.parent = Some(diff_summary(&desired.object.to_value()?, &observed.object.to_value()?));
    }
    for (r, new) in &after {
        match before.get(r) {
            None => p.created.push(r.clone()),
            Some(old) if old != new => {
                let summary = diff_summary(&new.to_value()?, &old.to_value()?);
                p.updated.push(Change { target: r.clone(), summary });
            }
            Some(_) => {}
        }
    }
    p.deleted = before.keys().filter(|r| !after.contains_key(*r)).cloned().collect();
    Ok(p)
}
