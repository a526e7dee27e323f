#![deny(clippy::await_holding_lock)]
//! # Deploygate Authorization - Layer 2: Access Control Engine
//!
//! Decides whether a caller may see or modify a deployment-scoped resource,
//! and which filter a collection query needs so only visible resources come
//! back. Every guard is a pure function over already-fetched data and a
//! [`PolicyTable`]; [`AccessControl`] performs the collaborator calls the
//! guards ask for.
//!
//! ```text
//! AccessLevelResolver ← LevelSufficiencyGuard ← MutationRightsGuard
//! GlobalPermissionGuard
//! VisibilityPredicateBuilder
//! ResourceOwnershipGuard
//!            ↑
//!      PolicyTable (per-kind ResourcePolicy) ← EngineConfig, PolicyStore
//! ```

pub mod access_control;
pub mod config;
pub mod deltas;
pub mod mutation;
pub mod ownership;
pub mod permission;
pub mod policy;
pub mod predicate;
pub mod resolver;
pub mod snapshot;
pub mod sufficiency;

pub use access_control::AccessControl;
pub use config::{EngineConfig, ReloadPolicy};
pub use mutation::{MutationAccess, MutationRightsGuard};
pub use ownership::{ResourceOwnershipGuard, Visibility};
pub use permission::GlobalPermissionGuard;
pub use policy::{Association, PolicyTable, ResourceKind, ResourcePolicy};
pub use predicate::{CallerClass, VisibilityPredicateBuilder};
pub use resolver::{AccessLevelResolver, LevelLookup};
pub use snapshot::PolicyStore;
pub use sufficiency::LevelSufficiencyGuard;
