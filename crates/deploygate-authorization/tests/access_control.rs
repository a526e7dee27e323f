//! End-to-end decisions through the async facade
//!
//! Deployments used throughout (see `deploygate_testkit::field_campaign`):
//!
//! ```text
//! river      private  u1 admin, u2 social
//! estuary    private  u2 engineer
//! coast      public   u1 basic
//! archive    private  nobody
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use deploygate_authorization::{
    AccessControl, EngineConfig, PolicyStore, PolicyTable, ReloadPolicy, ResourceKind,
};
use deploygate_core::permission::{CRUD_SENSORS, CRUD_VOCAB_RESOURCES};
use deploygate_core::{
    AccessLevel, Clause, DeploymentId, DeploymentLevelRecord, Filter, LevelRepository,
    OrPredicate, Platform, ResourceId, Result, ScopeError, Sensor, SnapshotRepository,
    SufficientLevels, UserId, VocabResource,
};
use deploygate_testkit::{
    admin_all, anonymous, deployment_ids, field_campaign_repository, member, CountingRepository,
};

type Counting = Arc<CountingRepository<SnapshotRepository>>;

fn facade_with(store: PolicyStore) -> (AccessControl, Counting) {
    let repo = Arc::new(CountingRepository::new(field_campaign_repository()));
    let access = AccessControl::new(repo.clone(), repo.clone(), Arc::new(store));
    (access, repo)
}

fn facade() -> (AccessControl, Counting) {
    facade_with(PolicyStore::default())
}

fn sensor_in(deployment: &str) -> Sensor {
    Sensor {
        id: ResourceId::new("thermistor"),
        has_deployment: Some(DeploymentId::new(deployment)),
    }
}

#[tokio::test]
async fn hidden_vocab_item_costs_one_level_lookup() {
    let (access, repo) = facade();
    let unit = VocabResource::new("secret-unit")
        .with_listed(false)
        .in_deployment("archive");

    let err = access
        .check_visibility(ResourceKind::Units, &unit, &member("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScopeError::Forbidden { .. }));
    assert!(!err.to_string().contains("archive"));

    let counts = repo.counts();
    assert_eq!(counts.get_levels_for_deployments, 1);
    assert_eq!(counts.total(), 1);
}

#[tokio::test]
async fn unlisted_vocab_item_visible_to_any_member() {
    let (access, repo) = facade();
    let unit = VocabResource::new("river-unit")
        .with_listed(false)
        .in_deployment("river");

    access
        .check_visibility(ResourceKind::Units, &unit, &member("u2"))
        .await
        .unwrap();
    assert!(access
        .check_visibility(ResourceKind::Units, &unit, &anonymous())
        .await
        .is_err());

    // Listed items and blanket holders need no lookup at all.
    repo.reset();
    access
        .check_visibility(ResourceKind::Units, &unit, &admin_all("u9"))
        .await
        .unwrap();
    access
        .check_visibility(ResourceKind::Units, &VocabResource::new("kelvin"), &anonymous())
        .await
        .unwrap();
    assert_eq!(repo.counts().total(), 0);
}

#[tokio::test]
async fn creator_sees_own_unlisted_item_outside_deployments() {
    let (access, _) = facade();
    let unit = VocabResource::new("draft").with_listed(false).with_creator("u1");

    access
        .check_visibility(ResourceKind::Units, &unit, &member("u1"))
        .await
        .unwrap();
    assert!(matches!(
        access
            .check_visibility(ResourceKind::Units, &unit, &member("u2"))
            .await,
        Err(ScopeError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn vocab_listing_uses_private_memberships_only() {
    let (access, repo) = facade();

    // u1 is also a member of the public `coast`, which stays out of the list.
    let predicate = access
        .visibility_predicate(ResourceKind::Disciplines, &member("u1"))
        .await
        .unwrap();
    assert_eq!(
        predicate,
        OrPredicate::AnyOf(vec![
            Clause::equals("listed", true),
            Clause::equals("createdBy", "u1"),
            Clause::is_in("belongsToDeployment", &deployment_ids(&["river"])),
        ])
    );
    let json = serde_json::to_string(&predicate).unwrap();
    assert!(!json.contains("coast"));
    assert_eq!(repo.counts().get_deployments, 1);

    repo.reset();
    let predicate = access
        .visibility_predicate(ResourceKind::Disciplines, &anonymous())
        .await
        .unwrap();
    assert_eq!(predicate.clauses(), &[Clause::equals("listed", true)]);
    assert_eq!(repo.counts().total(), 0);
}

#[tokio::test]
async fn sensor_listing_adds_public_deployments() {
    let (access, repo) = facade();

    let predicate = access
        .visibility_predicate(ResourceKind::Sensors, &member("u2"))
        .await
        .unwrap();
    assert_eq!(
        predicate,
        OrPredicate::AnyOf(vec![Clause::is_in(
            "hasDeployment",
            &deployment_ids(&["estuary", "river", "coast"])
        )])
    );
    assert_eq!(repo.counts().get_deployments, 2);
}

#[tokio::test]
async fn listing_filter_ands_explicit_filters() {
    let (access, _) = facade();
    let explicit = Filter::Clause(Clause::equals("id", "thermistor"));

    let filter = access
        .listing_filter(ResourceKind::Sensors, &anonymous(), Some(explicit.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        filter,
        Filter::And(vec![
            explicit,
            Filter::Or(vec![Filter::Clause(Clause::is_in(
                "hasDeployment",
                &deployment_ids(&["coast"])
            ))]),
        ])
    );
}

#[tokio::test]
async fn resolve_level_through_repository() {
    let (access, _) = facade();
    let river = DeploymentId::new("river");

    assert_eq!(
        access
            .require_level(&river, &member("u1"), &SufficientLevels::editors())
            .await
            .unwrap(),
        AccessLevel::Admin
    );
    assert!(matches!(
        access
            .require_level(&river, &member("u2"), &SufficientLevels::editors())
            .await,
        Err(ScopeError::InsufficientDeploymentAccessLevel { .. })
    ));
    assert!(matches!(
        access
            .resolve_level(&DeploymentId::new("missing"), &member("u1"), None)
            .await,
        Err(ScopeError::NotFound { .. })
    ));
}

#[tokio::test]
async fn moving_a_sensor_requires_editor_on_target() {
    let (access, _) = facade();

    // u1 administers river but is no member of estuary.
    let err = access
        .authorize_move(
            ResourceKind::Sensors,
            &sensor_in("river"),
            &sensor_in("estuary"),
            &member("u1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ScopeError::Forbidden { .. }));

    // u2 edits estuary but is only social on river.
    let err = access
        .authorize_move(
            ResourceKind::Sensors,
            &sensor_in("estuary"),
            &sensor_in("river"),
            &member("u2"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScopeError::InsufficientDeploymentAccessLevel { .. }
    ));

    let manager = member("m1").with_permission(CRUD_SENSORS);
    access
        .authorize_move(
            ResourceKind::Sensors,
            &sensor_in("archive"),
            &sensor_in("estuary"),
            &manager,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_and_delete_rights() {
    let (access, _) = facade();
    let unit = VocabResource::new("u").in_deployment("estuary");

    access
        .authorize_update(ResourceKind::Units, &unit, &member("u2"))
        .await
        .unwrap();
    assert!(access
        .authorize_delete(ResourceKind::Units, &unit, &member("u1"))
        .await
        .is_err());
    access
        .authorize_delete(
            ResourceKind::Units,
            &unit,
            &member("u1").with_permission(CRUD_VOCAB_RESOURCES),
        )
        .await
        .unwrap();

    assert!(matches!(
        access.authorize_create(ResourceKind::Units, &member("u2")),
        Err(ScopeError::PermissionRequired { .. })
    ));
}

#[tokio::test]
async fn platform_visible_through_any_of_its_deployments() {
    let (access, repo) = facade();
    let buoy = Platform::new("buoy", ["archive", "river"]);

    access
        .check_visibility(ResourceKind::Platforms, &buoy, &member("u2"))
        .await
        .unwrap();
    assert_eq!(repo.counts().get_levels_for_deployments, 1);

    assert!(matches!(
        access
            .check_visibility(ResourceKind::Platforms, &buoy, &member("u9"))
            .await,
        Err(ScopeError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn platform_rehost_checks_host_deployments() {
    let (access, _) = facade();
    let current = Platform::new("buoy", ["river"]);
    let proposed = current.clone().hosted_by("mooring");

    let river_host = Platform::new("mooring", ["river"]);
    access
        .authorize_platform_update(&current, &proposed, Some(&river_host), &member("u1"))
        .await
        .unwrap();

    let foreign_host = Platform::new("mooring", ["estuary", "coast"]);
    let err = access
        .authorize_platform_update(&current, &proposed, Some(&foreign_host), &member("u1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScopeError::InsufficientDeploymentAccessLevel { .. }
    ));
}

#[tokio::test]
async fn scoped_platform_listing() {
    let (access, _) = facade();

    let filter = access
        .authorize_scoped_platform_listing(&DeploymentId::new("coast"), &anonymous())
        .await
        .unwrap();
    assert_eq!(filter, Filter::Clause(Clause::equals("inDeployments", "coast")));

    assert!(matches!(
        access
            .authorize_scoped_platform_listing(&DeploymentId::new("archive"), &member("u1"))
            .await,
        Err(ScopeError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn reloaded_policy_applies_to_next_decision() {
    let (access, _) = facade_with(PolicyStore::new(
        PolicyTable::default(),
        ReloadPolicy::OnDemand,
    ));
    let curator = member("u5").with_permission("curate:units");
    assert!(!access
        .visibility_predicate(ResourceKind::Units, &curator)
        .await
        .unwrap()
        .is_unrestricted());

    let config = EngineConfig::from_toml_str(
        r#"
        [resources.units]
        full_access_permission = "curate:units"
        listed_flag = true
        tracks_creator = true
        association = { kind = "single", field = "belongsToDeployment" }
        "#,
    )
    .unwrap();
    access.store().reload_from_config(&config).unwrap();

    assert!(access
        .visibility_predicate(ResourceKind::Units, &curator)
        .await
        .unwrap()
        .is_unrestricted());
}

struct ReversedLevels(SnapshotRepository);

#[async_trait]
impl LevelRepository for ReversedLevels {
    async fn get_levels_for_deployments(
        &self,
        ids: &[DeploymentId],
        user_id: Option<&UserId>,
    ) -> Result<Vec<DeploymentLevelRecord>> {
        let mut records = self.0.get_levels_for_deployments(ids, user_id).await?;
        records.reverse();
        Ok(records)
    }
}

#[tokio::test]
async fn level_repository_contract_violation_is_internal() {
    let repo = Arc::new(field_campaign_repository());
    let access = AccessControl::new(
        repo,
        Arc::new(ReversedLevels(field_campaign_repository())),
        Arc::new(PolicyStore::default()),
    );
    let err = access
        .batch_resolve_levels(&deployment_ids(&["river", "coast"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScopeError::Internal { .. }));
    assert!(!err.is_operational());
}
