//! `ContainerSet`: runs `spec.replicas` copies of `spec.image` through one owned Deployment.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use whitebox_admission::{Defaults, FieldRule, Mutator, Rules, Validator};
use whitebox_core::{DependentDecl, DependentKind, Event, Fault, Mutation, Object, One, ReconcileState, Slot, Verdict};
use whitebox_reconcile::Reconciler;

use crate::ResourceType;

pub const RESOURCE: ResourceType = ResourceType::new("whitebox.summerwind.dev", "v1alpha1", "ContainerSet");
pub const DEPLOYMENTS: DependentKind<One> = DependentKind::new("apps", "v1", "Deployment");

/// Selector and pod label tying a Deployment's pods to their ContainerSet.
pub const LABEL: &str = "containerset";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSetStatus {
    pub healthy_replicas: i64,
}

pub struct ContainerSet;

fn rules() -> Rules<ContainerSetSpec> {
    Rules::<ContainerSetSpec>::new()
        .rule("'spec.replicas' must be specified", |s| s.replicas.is_some())
        .rule("'spec.replicas' must be non-zero value", |s| s.replicas != Some(0))
        .rule("'spec.image' must be specified", |s| s.image.is_some())
        .rule("'spec.image' is empty", |s| s.image.as_deref() != Some(""))
}

fn is_zero(v: &Value) -> bool { v.as_i64() == Some(0) }

impl Validator for ContainerSet {
    fn validate(&self, object: &Object) -> Result<Verdict, Fault> {
        let spec = object.spec_as::<ContainerSetSpec>()?.unwrap_or_default();
        Ok(rules().evaluate(&spec))
    }
}

impl Mutator for ContainerSet {
    fn mutate(&self, object: &Object) -> Result<Mutation, Fault> {
        Defaults::new()
            .field(FieldRule::at(&["spec", "replicas"]).or_insert(json!(1)).replace_if(is_zero, json!(1)))
            .evaluate(object)
    }
}

/// What the parent asks of its Deployment. Every field is required once admitted.
#[derive(Debug)]
struct Desired {
    name: String,
    namespace: String,
    replicas: i32,
    image: String,
}

impl Desired {
    fn from_parent(obj: &Object) -> Result<Self, Fault> {
        let spec = obj.spec_as::<ContainerSetSpec>()?.ok_or_else(|| Fault::missing("spec"))?;
        Ok(Self {
            name: obj.require_name()?.to_string(),
            namespace: obj.namespace().ok_or_else(|| Fault::missing("metadata.namespace"))?.to_string(),
            replicas: spec.replicas.ok_or_else(|| Fault::missing("spec.replicas"))?,
            image: spec.image.ok_or_else(|| Fault::missing("spec.image"))?,
        })
    }

    /// Full Deployment derived only from the parent, so re-creating it is byte-identical.
    fn deployment(&self) -> Result<Object, Fault> {
        let labels = BTreeMap::from([(LABEL.to_string(), self.name.clone())]);
        let deploy = Deployment {
            metadata: ObjectMeta { name: Some(self.name.clone()), namespace: Some(self.namespace.clone()), ..Default::default() },
            spec: Some(DeploymentSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector { match_labels: Some(labels.clone()), ..Default::default() },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                    spec: Some(PodSpec {
                        containers: vec![Container { name: self.name.clone(), image: Some(self.image.clone()), ..Default::default() }],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        Object::from_value(serde_json::to_value(&deploy).map_err(Fault::Encode)?)
    }

    /// Overwrite the fields the parent controls; everything else on the observed object stays.
    fn apply_to(&self, deploy: &mut Object) -> Result<(), Fault> {
        let spec = deploy.spec_mut()?;
        spec.insert("replicas".into(), json!(self.replicas));
        let container = spec
            .get_mut("template")
            .and_then(|t| t.pointer_mut("/spec/containers/0"))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Fault::missing(format!("dependents[{}][0].spec.template.spec.containers[0]", DEPLOYMENTS.key())))?;
        container.insert("image".into(), json!(self.image));
        Ok(())
    }
}

impl Reconciler for ContainerSet {
    fn dependents(&self) -> Vec<DependentDecl> { vec![DEPLOYMENTS.decl()] }

    fn reconcile(&self, state: &mut ReconcileState) -> Result<(), Fault> {
        let desired = Desired::from_parent(&state.object)?;
        let (created, available) = match state.dependents.one(&DEPLOYMENTS)? {
            Slot::Absent(slot) => {
                slot.insert(desired.deployment()?);
                (true, 0)
            }
            Slot::Present(deploy) => {
                desired.apply_to(deploy)?;
                (false, deploy.status_field("availableReplicas").and_then(Value::as_i64).unwrap_or(0))
            }
        };

        if created {
            counter!("reconcile_created_total", 1u64);
            info!(name = %desired.name, namespace = %desired.namespace, "deployment created");
            state.emit(Event::normal("CreateDeployment", "deployment created"));
        } else {
            debug!(name = %desired.name, replicas = desired.replicas, available, "deployment updated");
        }

        let status = ContainerSetStatus { healthy_replicas: available };
        if let Value::Object(fields) = serde_json::to_value(&status).map_err(Fault::Encode)? {
            state.object.status_mut()?.extend(fields);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired() -> Desired {
        Desired { name: "web".into(), namespace: "default".into(), replicas: 3, image: "nginx:1.25".into() }
    }

    #[test]
    fn template_is_derived_from_the_parent() {
        let d = desired().deployment().unwrap();
        assert_eq!(
            d.to_value().unwrap(),
            json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": { "name": "web", "namespace": "default" },
                "spec": {
                    "replicas": 3,
                    "selector": { "matchLabels": { "containerset": "web" } },
                    "template": {
                        "metadata": { "labels": { "containerset": "web" } },
                        "spec": { "containers": [{ "name": "web", "image": "nginx:1.25" }] }
                    }
                }
            })
        );
        assert_eq!(d, desired().deployment().unwrap());
    }

    #[test]
    fn update_touches_only_controlled_fields() {
        let mut observed = desired().deployment().unwrap();
        observed.metadata_mut().resource_version = Some("42".into());
        observed.spec_mut().unwrap().insert("strategy".into(), json!({ "type": "Recreate" }));

        let next = Desired { replicas: 5, image: "nginx:1.26".into(), ..desired() };
        next.apply_to(&mut observed).unwrap();
        let v = observed.to_value().unwrap();
        assert_eq!(v["spec"]["replicas"], json!(5));
        assert_eq!(v["spec"]["template"]["spec"]["containers"][0]["image"], json!("nginx:1.26"));
        assert_eq!(v["spec"]["strategy"], json!({ "type": "Recreate" }));
        assert_eq!(v["metadata"]["resourceVersion"], json!("42"));
    }

    #[test]
    fn update_without_containers_faults() {
        let mut observed = Object::from_value(json!({
            "apiVersion": "apps/v1", "kind": "Deployment",
            "metadata": { "name": "web", "namespace": "default" },
            "spec": { "template": { "spec": { "containers": [] } } }
        }))
        .unwrap();
        assert!(matches!(desired().apply_to(&mut observed), Err(Fault::MissingField(_))));
    }

    #[test]
    fn rules_are_ordered_replicas_first() {
        let r = rules();
        assert_eq!(r.len(), 4);
        assert_eq!(r.evaluate(&ContainerSetSpec::default()), Verdict::Deny("'spec.replicas' must be specified".into()));
        let spec = ContainerSetSpec { replicas: Some(2), image: Some(String::new()) };
        assert_eq!(r.evaluate(&spec), Verdict::Deny("'spec.image' is empty".into()));
    }

    #[test]
    fn parent_without_namespace_faults() {
        let obj = Object::from_value(json!({ "metadata": { "name": "web" }, "spec": { "replicas": 1, "image": "x" } })).unwrap();
        let err = Desired::from_parent(&obj).unwrap_err();
        assert!(err.to_string().contains("metadata.namespace"), "err={}", err);
    }
}
