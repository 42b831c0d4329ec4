use json_patch::PatchOperation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary { pub adds: usize, pub updates: usize, pub removes: usize }

impl DiffSummary {
    pub fn is_empty(&self) -> bool { self.adds == 0 && self.updates == 0 && self.removes == 0 }
}

/// Count the field-level operations needed to turn `base` into `target`.
pub fn diff_summary(target: &Value, base: &Value) -> DiffSummary {
    let mut s = DiffSummary::default();
    for op in json_patch::diff(base, target).0 {
        match op {
            PatchOperation::Add(_) => s.adds += 1,
            PatchOperation::Remove(_) => s.removes += 1,
            _ => s.updates += 1,
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_adds_updates_removes() {
        let base = json!({ "a": 1, "b": { "x": 1 }, "gone": true });
        let target = json!({ "a": 2, "b": { "x": 1, "y": 2 } });
        let s = diff_summary(&target, &base);
        assert_eq!(s, DiffSummary { adds: 1, updates: 1, removes: 1 });
    }

    #[test]
    fn identical_documents_are_empty() {
        let v = json!({ "spec": { "replicas": 3 } });
        assert!(diff_summary(&v, &v).is_empty());
    }
}
