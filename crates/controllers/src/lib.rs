//! Concrete controllers built on the admission and reconcile engines.
//!
//! Each controller is a unit type implementing all three hooks ([`Validator`], [`Mutator`],
//! [`Reconciler`]) for one custom resource type. The [`registry`] maps controller names to
//! those hooks and renders the registration manifest a runtime consumes.

#![forbid(unsafe_code)]

pub mod containerset;
pub mod noop;
pub mod registry;

pub use registry::{all, lookup, manifest, Controller, Manifest, ResourceType};
pub use whitebox_admission::{Mutator, Validator};
pub use whitebox_reconcile::Reconciler;
