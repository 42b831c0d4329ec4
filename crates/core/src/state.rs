use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::key::{DependentKind, Many, One};
use crate::{Event, Fault, Object, ResourceKey};

/// Observed (or desired) dependents of one parent, grouped by resource-type key.
///
/// Ordered by key so encoding the same set always yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dependents(BTreeMap<ResourceKey, Vec<Object>>);

/// The single dependent of a one-to-one relationship.
pub enum Slot<'a> {
    Absent(Vacant<'a>),
    Present(&'a mut Object),
}

pub struct Vacant<'a> {
    items: &'a mut Vec<Object>,
}

impl<'a> Vacant<'a> {
    pub fn insert(self, obj: Object) -> &'a mut Object {
        let items = self.items;
        let idx = items.len();
        items.push(obj);
        &mut items[idx]
    }
}

impl Dependents {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    pub fn get(&self, key: &ResourceKey) -> &[Object] { self.0.get(key).map(Vec::as_slice).unwrap_or(&[]) }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &Vec<Object>)> { self.0.iter() }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> { self.0.keys() }

    pub fn insert(&mut self, key: ResourceKey, items: Vec<Object>) -> Option<Vec<Object>> { self.0.insert(key, items) }

    /// Slot for a one-to-one dependent kind. More than one observed object is a fault:
    /// there is no way to tell which one is authoritative.
    pub fn one(&mut self, kind: &DependentKind<One>) -> Result<Slot<'_>, Fault> {
        let key = kind.key();
        let items = self.0.entry(key.clone()).or_default();
        match items.len() {
            0 => Ok(Slot::Absent(Vacant { items })),
            1 => Ok(Slot::Present(&mut items[0])),
            found => Err(Fault::TooManyDependents { key, found }),
        }
    }

    pub fn many(&mut self, kind: &DependentKind<Many>) -> &mut Vec<Object> { self.0.entry(kind.key()).or_default() }
}

impl FromIterator<(ResourceKey, Vec<Object>)> for Dependents {
    fn from_iter<I: IntoIterator<Item = (ResourceKey, Vec<Object>)>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

/// Unit exchanged with a reconcile hook: the parent, its dependents and this pass's events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileState {
    pub object: Object,
    #[serde(default)]
    pub dependents: Dependents,
    /// Read-only resources the parent refers to; passed through untouched.
    #[serde(default, skip_serializing_if = "Dependents::is_empty")]
    pub references: Dependents,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requeue: bool,
    /// Seconds; advisory to the runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requeue_after: Option<u64>,
}

impl ReconcileState {
    pub fn new(object: Object, dependents: Dependents) -> Self {
        Self { object, dependents, references: Dependents::new(), events: Vec::new(), requeue: false, requeue_after: None }
    }

    pub fn emit(&mut self, ev: Event) { self.events.push(ev); }
}
