//! Controllers by name, and the registration manifest a runtime reads to wire up hooks.

use serde::Serialize;
use whitebox_admission::{Mutator, Validator};
use whitebox_core::{DependentDecl, GroupVersionKind};
use whitebox_reconcile::Reconciler;

use crate::containerset::{self, ContainerSet};
use crate::noop::{self, Noop};

/// Group/version/kind of a controller's parent resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
}

impl ResourceType {
    pub const fn new(group: &'static str, version: &'static str, kind: &'static str) -> Self { Self { group, version, kind } }

    pub fn gvk(&self) -> GroupVersionKind { GroupVersionKind::gvk(self.group, self.version, self.kind) }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() { self.version.to_string() } else { format!("{}/{}", self.group, self.version) }
    }
}

pub struct Controller {
    pub name: &'static str,
    pub resource: ResourceType,
    pub validator: &'static dyn Validator,
    pub mutator: &'static dyn Mutator,
    pub reconciler: &'static dyn Reconciler,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller").field("name", &self.name).field("resource", &self.resource).finish_non_exhaustive()
    }
}

const CONTROLLERS: &[Controller] = &[
    Controller {
        name: "containerset",
        resource: containerset::RESOURCE,
        validator: &ContainerSet,
        mutator: &ContainerSet,
        reconciler: &ContainerSet,
    },
    Controller { name: "noop", resource: noop::RESOURCE, validator: &Noop, mutator: &Noop, reconciler: &Noop },
];

pub fn all() -> &'static [Controller] { CONTROLLERS }

pub fn lookup(name: &str) -> Option<&'static Controller> { CONTROLLERS.iter().find(|c| c.name == name) }

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub controllers: Vec<ControllerManifest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerManifest {
    pub name: String,
    pub resource: ResourceType,
    pub dependents: Vec<DependentDecl>,
    pub validator: HookCommand,
    pub mutator: HookCommand,
    pub reconciler: HookCommand,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookCommand {
    pub exec: Exec,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exec {
    pub command: String,
    pub args: Vec<String>,
}

fn hook(command: &str, sub: &str, controller: &str) -> HookCommand {
    HookCommand {
        exec: Exec { command: command.to_string(), args: vec![sub.to_string(), "--controller".into(), controller.to_string()] },
    }
}

/// Registration for every controller, with hooks invoking `command`.
pub fn manifest(command: &str) -> Manifest {
    let controllers = CONTROLLERS
        .iter()
        .map(|c| ControllerManifest {
            name: c.name.to_string(),
            resource: c.resource,
            dependents: c.reconciler.dependents(),
            validator: hook(command, "validate", c.name),
            mutator: hook(command, "mutate", c.name),
            reconciler: hook(command, "reconcile", c.name),
        })
        .collect();
    Manifest { controllers }
}
