//! Sensors and timeseries
//!
//! Three tiers decide what a caller sees: the blanket get-permission sees
//! everything, the blanket deployment permission sees everything that belongs
//! to a deployment, and everyone else sees what their own and the public
//! deployments hold. Resources outside any deployment are only visible to
//! the first tier.

use deploygate_core::{DeploymentId, OrPredicate, Result, ScopeError, ScopedResource, User};
use serde::Serialize;

use crate::ownership::{ResourceOwnershipGuard, Visibility};
use crate::policy::{PolicyTable, ResourceKind};
use crate::predicate::{CallerClass, VisibilityPredicateBuilder};

/// Visibility tier of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorTier {
    /// Holds the blanket get-permission.
    Blanket,
    /// Holds the blanket deployment permission.
    AdminAll,
    /// Per-deployment membership only.
    Member,
}

fn ensure_kind(kind: ResourceKind) -> Result<()> {
    match kind {
        ResourceKind::Sensors | ResourceKind::Timeseries => Ok(()),
        other => Err(ScopeError::internal(format!(
            "'{other}' is not a sensor or timeseries kind"
        ))),
    }
}

/// Tier of `user` for `kind`.
pub fn tier(table: &PolicyTable, kind: ResourceKind, user: &User) -> Result<SensorTier> {
    ensure_kind(kind)?;
    Ok(
        match VisibilityPredicateBuilder::new(table, kind).caller_class(user) {
            CallerClass::FullAccess => SensorTier::Blanket,
            CallerClass::AdminAllDeployments => SensorTier::AdminAll,
            CallerClass::Authenticated | CallerClass::Unauthenticated => SensorTier::Member,
        },
    )
}

/// Visibility predicate for a sensor or timeseries listing.
pub fn listing_predicate(
    table: &PolicyTable,
    kind: ResourceKind,
    user: &User,
    own: &[DeploymentId],
    public: &[DeploymentId],
) -> Result<OrPredicate> {
    ensure_kind(kind)?;
    Ok(VisibilityPredicateBuilder::new(table, kind).build(user, own, public))
}

/// I/O-free visibility of a single sensor or timeseries.
pub fn assess<R>(table: &PolicyTable, kind: ResourceKind, resource: &R, user: &User) -> Result<Visibility>
where
    R: ScopedResource + ?Sized,
{
    ensure_kind(kind)?;
    Ok(ResourceOwnershipGuard::new(table, kind).assess_visibility(resource, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploygate_core::permission::{ADMIN_ALL_DEPLOYMENTS, GET_SENSORS, GET_TIMESERIES};
    use deploygate_core::{Clause, ResourceId, Sensor, Timeseries};

    fn loose_sensor() -> Sensor {
        Sensor {
            id: ResourceId::new("s0"),
            has_deployment: None,
        }
    }

    #[test]
    fn test_tiers_are_ordered_by_permission() {
        let table = PolicyTable::default();
        let blanket = User::authenticated("u1")
            .with_permission(GET_SENSORS)
            .with_permission(ADMIN_ALL_DEPLOYMENTS);
        let admin = User::authenticated("u1").with_permission(ADMIN_ALL_DEPLOYMENTS);

        assert_eq!(
            tier(&table, ResourceKind::Sensors, &blanket).unwrap(),
            SensorTier::Blanket
        );
        assert_eq!(
            tier(&table, ResourceKind::Timeseries, &blanket).unwrap(),
            SensorTier::AdminAll
        );
        assert_eq!(
            tier(&table, ResourceKind::Sensors, &admin).unwrap(),
            SensorTier::AdminAll
        );
        assert_eq!(
            tier(&table, ResourceKind::Sensors, &User::anonymous()).unwrap(),
            SensorTier::Member
        );
        assert!(tier(&table, ResourceKind::Units, &admin).is_err());
    }

    #[test]
    fn test_unassociated_only_for_blanket_holders() {
        let table = PolicyTable::default();
        let admin = User::authenticated("u1").with_permission(ADMIN_ALL_DEPLOYMENTS);
        assert_eq!(
            assess(&table, ResourceKind::Sensors, &loose_sensor(), &admin).unwrap(),
            Visibility::Hidden
        );
        let blanket = User::authenticated("u1").with_permission(GET_SENSORS);
        assert_eq!(
            assess(&table, ResourceKind::Sensors, &loose_sensor(), &blanket).unwrap(),
            Visibility::Visible
        );
    }

    #[test]
    fn test_timeseries_listing_for_members() {
        let table = PolicyTable::default();
        let own = [DeploymentId::new("d1")];
        let public = [DeploymentId::new("p1")];
        let predicate = listing_predicate(
            &table,
            ResourceKind::Timeseries,
            &User::authenticated("u1"),
            &own,
            &public,
        )
        .unwrap();
        assert_eq!(
            predicate,
            OrPredicate::AnyOf(vec![Clause::is_in(
                "hasDeployment",
                [&own[0], &public[0]]
            )])
        );
        let series = Timeseries {
            id: ResourceId::new("t1"),
            has_deployment: Some(DeploymentId::new("p1")),
        };
        assert!(predicate.matches(&series.to_document()));

        let blanket = User::authenticated("u1").with_permission(GET_TIMESERIES);
        assert!(
            listing_predicate(&table, ResourceKind::Timeseries, &blanket, &[], &[])
                .unwrap()
                .is_unrestricted()
        );
    }
}
