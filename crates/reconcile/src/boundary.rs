use tracing::error;
use whitebox_core::{Arity, DependentDecl, Dependents, Fault, ReconcileState};

fn decl_for<'a>(decls: &'a [DependentDecl], key: &whitebox_core::ResourceKey) -> Option<&'a DependentDecl> {
    decls.iter().find(|d| &d.key == key)
}

/// Observed dependents must only use declared keys, and one-to-one kinds hold at most one object.
pub fn check_dependents(deps: &Dependents, decls: &[DependentDecl]) -> Result<(), Fault> {
    for (key, items) in deps.iter() {
        let decl = decl_for(decls, key)
            .ok_or_else(|| Fault::invalid(format!("dependents[{}]", key), "kind is not declared by this controller"))?;
        if decl.arity == Arity::One && items.len() > 1 {
            error!(key = %key, found = items.len(), "too many dependents for a one-to-one kind");
            return Err(Fault::TooManyDependents { key: key.clone(), found: items.len() });
        }
    }
    Ok(())
}

/// Check a desired state against the observed state it was computed from.
pub fn validate_transition(observed: &ReconcileState, desired: &ReconcileState, decls: &[DependentDecl]) -> Result<(), Fault> {
    let (old, new) = (&observed.object, &desired.object);
    if old.api_version != new.api_version || old.kind != new.kind {
        return Err(Fault::Transition("object: group/version/kind does not match".into()));
    }
    if old.namespace() != new.namespace() {
        return Err(Fault::Transition("object: namespace does not match".into()));
    }
    if old.name() != new.name() {
        return Err(Fault::Transition("object: name does not match".into()));
    }

    for (key, items) in desired.dependents.iter() {
        let decl = decl_for(decls, key)
            .ok_or_else(|| Fault::Transition(format!("dependents[{}]: unexpected group/version/kind", key)))?;
        if decl.arity == Arity::One && items.len() > 1 {
            return Err(Fault::Transition(format!("dependents[{}]: at most one object is allowed", key)));
        }
        for (i, dep) in items.iter().enumerate() {
            if dep.resource_key() != *key {
                return Err(Fault::Transition(format!("dependents[{}][{}]: kind does not match key", key, i)));
            }
            if dep.name().map_or(true, str::is_empty) {
                return Err(Fault::Transition(format!("dependents[{}][{}]: name must be specified", key, i)));
            }
            if dep.namespace() != new.namespace() {
                return Err(Fault::Transition(format!("dependents[{}][{}]: namespace does not match", key, i)));
            }
        }
    }
    Ok(())
}
