//! Resource-type keys and declared dependent kinds.

use std::marker::PhantomData;

use kube::core::GroupVersionKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Fault;

static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-z0-9]+\.v[0-9]+(?:(?:alpha|beta)[0-9]+)?(?:\.[a-z0-9](?:[-a-z0-9]*[a-z0-9])?(?:\.[a-z0-9](?:[-a-z0-9]*[a-z0-9])?)*)?$",
    )
    .expect("static resource key pattern")
});

/// Lowercased `kind.version.group` (or `kind.version` for the core group), e.g. `deployment.v1.apps`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn from_gvk(gvk: &GroupVersionKind) -> Self {
        let key = if gvk.group.is_empty() {
            format!("{}.{}", gvk.kind, gvk.version)
        } else {
            format!("{}.{}.{}", gvk.kind, gvk.version, gvk.group)
        };
        Self(key.to_lowercase())
    }

    pub fn parse(s: &str) -> Result<Self, Fault> {
        if KEY_RE.is_match(s) { Ok(Self(s.to_string())) } else { Err(Fault::InvalidKey(s.to_string())) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for ResourceKey {
    type Error = Fault;
    fn try_from(s: String) -> Result<Self, Fault> { Self::parse(&s) }
}

impl From<ResourceKey> for String {
    fn from(k: ResourceKey) -> String { k.0 }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

/// How many dependents of one kind a single parent may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    One,
    Many,
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level cardinality of a parent→dependent relationship.
pub trait Cardinality: sealed::Sealed {
    const ARITY: Arity;
}

/// At most one dependent per parent.
#[derive(Debug, Clone, Copy)]
pub enum One {}
/// Any number of dependents per parent.
#[derive(Debug, Clone, Copy)]
pub enum Many {}

impl sealed::Sealed for One {}
impl sealed::Sealed for Many {}
impl Cardinality for One { const ARITY: Arity = Arity::One; }
impl Cardinality for Many { const ARITY: Arity = Arity::Many; }

/// A dependent resource type owned by a controller's parent resource.
#[derive(Debug, Clone, Copy)]
pub struct DependentKind<C: Cardinality> {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    _cardinality: PhantomData<C>,
}

impl<C: Cardinality> DependentKind<C> {
    pub const fn new(group: &'static str, version: &'static str, kind: &'static str) -> Self {
        Self { group, version, kind, _cardinality: PhantomData }
    }

    pub fn gvk(&self) -> GroupVersionKind { GroupVersionKind::gvk(self.group, self.version, self.kind) }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() { self.version.to_string() } else { format!("{}/{}", self.group, self.version) }
    }

    pub fn key(&self) -> ResourceKey { ResourceKey::from_gvk(&self.gvk()) }

    pub fn decl(&self) -> DependentDecl {
        DependentDecl { key: self.key(), api_version: self.api_version(), kind: self.kind.to_string(), arity: C::ARITY }
    }
}

/// Type-erased dependent declaration, used at the request boundary and in manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentDecl {
    pub key: ResourceKey,
    pub api_version: String,
    pub kind: String,
    pub arity: Arity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_gvk_lowercases_and_orders_kind_version_group() {
        let k = ResourceKey::from_gvk(&GroupVersionKind::gvk("apps", "v1", "Deployment"));
        assert_eq!(k.as_str(), "deployment.v1.apps");
        let core = ResourceKey::from_gvk(&GroupVersionKind::gvk("", "v1", "ConfigMap"));
        assert_eq!(core.as_str(), "configmap.v1");
    }

    #[test]
    fn parse_accepts_well_formed_keys() {
        for k in ["deployment.v1.apps", "configmap.v1", "issue.v1alpha1.whitebox.summerwind.dev", "job.v2beta3.batch"] {
            assert!(ResourceKey::parse(k).is_ok(), "k={}", k);
        }
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for k in ["Deployment.v1.apps", "deployment", "deployment.1.apps", "deployment.v1.", ""] {
            assert!(matches!(ResourceKey::parse(k), Err(Fault::InvalidKey(_))), "k={}", k);
        }
    }

    #[test]
    fn declared_kind_carries_arity() {
        const DEPLOYMENTS: DependentKind<One> = DependentKind::new("apps", "v1", "Deployment");
        const CONFIGMAPS: DependentKind<Many> = DependentKind::new("", "v1", "ConfigMap");
        assert_eq!(DEPLOYMENTS.decl().arity, Arity::One);
        assert_eq!(DEPLOYMENTS.api_version(), "apps/v1");
        assert_eq!(CONFIGMAPS.decl().arity, Arity::Many);
        assert_eq!(CONFIGMAPS.api_version(), "v1");
    }
}
