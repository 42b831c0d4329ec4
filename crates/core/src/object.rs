use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::GroupVersionKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Fault, ResourceKey};

/// A Kubernetes-style object as seen by a hook: typed envelope, loosely typed `spec`/`status`.
///
/// Top-level fields other than the envelope are kept in `extra`. Re-encoding keeps the set of
/// present members, so a patch planned against [`Object::to_value`] applies to the original
/// document. `metadata` is decoded through `ObjectMeta`: unknown metadata keys are dropped and
/// timestamps are normalized to whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Object {
    pub fn from_value(v: Value) -> Result<Self, Fault> { serde_json::from_value(v).map_err(Fault::Decode) }

    pub fn to_value(&self) -> Result<Value, Fault> { serde_json::to_value(self).map_err(Fault::Encode) }

    pub fn name(&self) -> Option<&str> { self.metadata.as_ref().and_then(|m| m.name.as_deref()) }
    pub fn namespace(&self) -> Option<&str> { self.metadata.as_ref().and_then(|m| m.namespace.as_deref()) }

    /// Mutable metadata, created empty when absent.
    pub fn metadata_mut(&mut self) -> &mut ObjectMeta { self.metadata.get_or_insert_with(ObjectMeta::default) }

    /// Name, or a fault naming the missing field.
    pub fn require_name(&self) -> Result<&str, Fault> { self.name().ok_or_else(|| Fault::missing("metadata.name")) }

    pub fn gvk(&self) -> GroupVersionKind {
        let (group, version) = match self.api_version.split_once('/') {
            Some((g, v)) => (g, v),
            None => ("", self.api_version.as_str()),
        };
        GroupVersionKind::gvk(group, version, &self.kind)
    }

    pub fn resource_key(&self) -> ResourceKey { ResourceKey::from_gvk(&self.gvk()) }

    /// Decode `spec` into a typed view. `Ok(None)` when the object carries no spec.
    pub fn spec_as<T: DeserializeOwned>(&self) -> Result<Option<T>, Fault> {
        match &self.spec {
            None => Ok(None),
            Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| Fault::invalid("spec", e)),
        }
    }

    pub fn status_field(&self, name: &str) -> Option<&Value> { self.status.as_ref().and_then(|s| s.get(name)) }

    /// Mutable status map, created empty when absent.
    pub fn status_mut(&mut self) -> Result<&mut Map<String, Value>, Fault> {
        self.status
            .get_or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| Fault::invalid("status", "not an object"))
    }

    /// Mutable spec map, created empty when absent.
    pub fn spec_mut(&mut self) -> Result<&mut Map<String, Value>, Fault> {
        self.spec
            .get_or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| Fault::invalid("spec", "not an object"))
    }
}
