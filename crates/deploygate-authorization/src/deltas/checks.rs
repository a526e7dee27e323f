//! Quality-control checks
//!
//! A check names its deployment through the nested `appliesTo.hasDeployment`
//! field. Checks that apply to no deployment are visible to everyone; the
//! rest follow the caller's own and the public deployments.

use deploygate_core::{Check, DeploymentId, Filter, OrPredicate, User};

use crate::ownership::{ResourceOwnershipGuard, Visibility};
use crate::policy::{PolicyTable, ResourceKind};
use crate::predicate::VisibilityPredicateBuilder;

/// Policy table entry used for checks.
pub const KIND: ResourceKind = ResourceKind::Checks;

/// Restriction for a check listing, combined with the request's own filter.
///
/// For callers without the blanket permission this is
/// `{appliesTo.hasDeployment:{exists:false}} OR {appliesTo.hasDeployment:{in: own ∪ public}}`.
pub fn listing_filter(
    table: &PolicyTable,
    user: &User,
    own: &[DeploymentId],
    public: &[DeploymentId],
    explicit: Option<Filter>,
) -> Option<Filter> {
    listing_predicate(table, user, own, public).restrict(explicit)
}

/// Visibility predicate for a check listing.
pub fn listing_predicate(
    table: &PolicyTable,
    user: &User,
    own: &[DeploymentId],
    public: &[DeploymentId],
) -> OrPredicate {
    VisibilityPredicateBuilder::new(table, KIND).build(user, own, public)
}

/// I/O-free visibility of a single check.
pub fn assess(table: &PolicyTable, check: &Check, user: &User) -> Visibility {
    ResourceOwnershipGuard::new(table, KIND).assess_visibility(check, user)
}
