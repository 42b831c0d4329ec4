use serde_json::{Map, Value};
use tracing::debug;
use whitebox_core::{Fault, Mutation, Object};
use whitebox_patch::{pointer, PatchSet};

/// Defaulting/correction rule for one field, addressed by unescaped path tokens.
///
/// Absent (or `null`) field with a default: `add`, creating missing parent objects in the same
/// operation. Present field matching the sentinel predicate: `replace`. Otherwise nothing.
pub struct FieldRule {
    path: &'static [&'static str],
    default: Option<Value>,
    correction: Option<(fn(&Value) -> bool, Value)>,
}

impl FieldRule {
    pub fn at(path: &'static [&'static str]) -> Self { Self { path, default: None, correction: None } }

    pub fn or_insert(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn replace_if(mut self, sentinel: fn(&Value) -> bool, value: Value) -> Self {
        self.correction = Some((sentinel, value));
        self
    }

    fn dotted(&self, depth: usize) -> String { self.path[..depth].join(".") }

    /// The single operation this rule needs against `doc`, if any.
    fn plan(&self, doc: &Value) -> Result<Option<PatchSet>, Fault> {
        let mut cur = doc;
        for (depth, token) in self.path.iter().enumerate() {
            let map = cur.as_object().ok_or_else(|| Fault::invalid(self.dotted(depth), "not an object"))?;
            match map.get(*token) {
                Some(next) if !next.is_null() => cur = next,
                _ => {
                    let Some(default) = &self.default else { return Ok(None) };
                    let value = self.path[depth + 1..].iter().rev().fold(default.clone(), |acc, t| {
                        let mut m = Map::new();
                        m.insert((*t).to_string(), acc);
                        Value::Object(m)
                    });
                    let mut set = PatchSet::new();
                    set.add(pointer(self.path[..=depth].iter().copied()), value);
                    return Ok(Some(set));
                }
            }
        }
        match &self.correction {
            Some((sentinel, value)) if sentinel(cur) => {
                let mut set = PatchSet::new();
                set.replace(pointer(self.path.iter().copied()), value.clone());
                Ok(Some(set))
            }
            _ => Ok(None),
        }
    }
}

/// Ordered field rules evaluated in priority order into one accumulated patch.
#[derive(Default)]
pub struct Defaults {
    fields: Vec<FieldRule>,
}

impl Defaults {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn evaluate(&self, object: &Object) -> Result<Mutation, Fault> {
        let mut doc = object.to_value()?;
        let mut out = PatchSet::new();
        for rule in &self.fields {
            if let Some(step) = rule.plan(&doc)? {
                // later rules must see this correction
                step.apply(&mut doc)?;
                debug!(path = %rule.path.join("."), "field corrected");
                out.extend(step);
            }
        }
        Ok(if out.is_empty() { Mutation::Unchanged } else { Mutation::Patch(out) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object { Object::from_value(v).unwrap() }

    fn patch_of(m: Mutation) -> Value {
        match m {
            Mutation::Patch(set) => serde_json::to_value(set).unwrap(),
            Mutation::Unchanged => panic!("expected a patch"),
        }
    }

    fn replicas() -> FieldRule {
        FieldRule::at(&["spec", "replicas"]).or_insert(json!(1)).replace_if(|v| v.as_i64() == Some(0), json!(1))
    }

    #[test]
    fn absent_field_is_added() {
        let d = Defaults::new().field(replicas());
        let m = d.evaluate(&obj(json!({ "spec": { "image": "x" } }))).unwrap();
        assert_eq!(patch_of(m), json!([{ "op": "add", "path": "/spec/replicas", "value": 1 }]));
    }

    #[test]
    fn absent_parent_is_added_with_the_field() {
        let d = Defaults::new().field(replicas());
        let m = d.evaluate(&obj(json!({ "metadata": { "name": "a" } }))).unwrap();
        assert_eq!(patch_of(m), json!([{ "op": "add", "path": "/spec", "value": { "replicas": 1 } }]));
    }

    #[test]
    fn absent_metadata_is_added_not_assumed() {
        let d = Defaults::new().field(FieldRule::at(&["metadata", "annotations", "owner"]).or_insert(json!("me")));
        let raw = json!({ "spec": { "replicas": 2 } });
        let m = d.evaluate(&obj(raw.clone())).unwrap();
        assert_eq!(patch_of(m.clone()), json!([{ "op": "add", "path": "/metadata", "value": { "annotations": { "owner": "me" } } }]));

        let Mutation::Patch(set) = m else { unreachable!() };
        let mut doc = raw;
        set.apply(&mut doc).unwrap();
        assert_eq!(doc["metadata"]["annotations"]["owner"], json!("me"));
    }

    #[test]
    fn sentinel_value_is_replaced() {
        let d = Defaults::new().field(replicas());
        let m = d.evaluate(&obj(json!({ "spec": { "replicas": 0 } }))).unwrap();
        assert_eq!(patch_of(m), json!([{ "op": "replace", "path": "/spec/replicas", "value": 1 }]));
    }

    #[test]
    fn valid_value_is_left_alone() {
        let d = Defaults::new().field(replicas());
        assert_eq!(d.evaluate(&obj(json!({ "spec": { "replicas": 4 } }))).unwrap(), Mutation::Unchanged);
    }

    #[test]
    fn later_rules_see_earlier_corrections() {
        let d = Defaults::new()
            .field(replicas())
            .field(FieldRule::at(&["spec", "paused"]).or_insert(json!(false)));
        let m = d.evaluate(&obj(json!({}))).unwrap();
        assert_eq!(
            patch_of(m),
            json!([
                { "op": "add", "path": "/spec", "value": { "replicas": 1 } },
                { "op": "add", "path": "/spec/paused", "value": false }
            ])
        );
    }

    #[test]
    fn non_object_parent_is_a_fault() {
        let d = Defaults::new().field(replicas());
        let err = d.evaluate(&obj(json!({ "spec": "oops" }))).unwrap_err();
        assert!(matches!(err, Fault::InvalidField { .. }), "err={}", err);
    }
}
