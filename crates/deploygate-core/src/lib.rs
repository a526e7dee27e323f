//! # Deploygate Core - Layer 1: Shared Vocabulary
//!
//! Types shared by every deploygate crate: caller identity, deployments and their
//! per-user access levels, deployment-scoped resources, the predicate shapes
//! handed to the downstream query layer, and the unified error type.
//!
//! The collaborator interfaces the engine consumes (deployment lookup and batched
//! level lookup) live in [`repository`]; implementations belong to the gateway,
//! apart from the in-memory [`repository::SnapshotRepository`].
//!
//! # Crate Architecture
//!
//! ```text
//! deploygate-core            (this crate: model, Clause, ScopeError, repository traits)
//!     ↑
//! deploygate-authorization   (guards, predicate builder, policy table, AccessControl)
//!     ↑
//! deploygate-cli / gateway controllers
//! ```

pub mod access_level;
pub mod clause;
pub mod deployment;
pub mod errors;
pub mod identifiers;
pub mod permission;
pub mod repository;
pub mod resource;
pub mod user;

pub use access_level::{AccessLevel, SufficientLevels};
pub use clause::{Clause, Condition, Filter, OrPredicate};
pub use deployment::{Deployment, DeploymentFilter, DeploymentLevelRecord, DeploymentUser};
pub use errors::{Result, ScopeError};
pub use identifiers::{DeploymentId, PlatformId, ResourceId, UserId};
pub use permission::Permission;
pub use repository::{DeploymentRepository, LevelRepository, SnapshotRepository};
pub use resource::{Check, CheckTarget, Platform, ScopedResource, Sensor, Timeseries, VocabResource};
pub use user::User;
