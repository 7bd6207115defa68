/*!
 * Access manager: fetch path, fail-closed behaviour and invalidation on role changes
 */

use crate::common::{manager, manager_with_config, store, InstrumentedSource};
use pitch_guard::permissions::{AccessDecision, AccessType, DenialReason, RouteAccessKey, Surface};
use pitch_guard::{AccessConfig, Role, RoleAssignment, Verdict};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let source = Arc::new(InstrumentedSource::new(store(&[("u1", &[Role::Parent])])));
    let manager = manager(source.clone());

    let first = manager.authorize(Surface::Edge, Some("u1"), "/team/T1").await;
    let second = manager.authorize(Surface::Server, Some("u1"), "/team/T1").await;

    assert!(first.is_granted());
    match second {
        Verdict::Granted(grant) => {
            assert!(grant.cached);
            assert_eq!(grant.access_type, AccessType::MultiRole);
        }
        other => panic!("expected grant, got {other:?}"),
    }
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_anonymous_never_fetches() {
    let source = Arc::new(InstrumentedSource::new(store(&[])));
    let manager = manager(source.clone());

    let verdict = manager.authorize(Surface::Edge, None, "/coach/dashboard").await;
    let denial = verdict.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::LoginRequired);
    assert_eq!(denial.redirect_to, "/login");

    assert!(manager.authorize(Surface::Edge, None, "/about").await.is_granted());
    assert_eq!(source.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_times_out_closed_and_is_not_cached() {
    let source = Arc::new(
        InstrumentedSource::new(store(&[("u1", &[Role::Coach])])).with_delay(Duration::from_secs(30)),
    );
    let config = AccessConfig {
        fetch_timeout: Duration::from_millis(50),
        ..AccessConfig::default()
    };
    let manager = manager_with_config(source.clone(), config);

    let verdict = manager.authorize(Surface::Api, Some("u1"), "/coach/dashboard").await;
    let denial = verdict.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::UpstreamUnavailable);
    assert_eq!(denial.context.as_ref().unwrap().roles(), &[] as &[Role]);

    let stats = manager.cache_stats();
    assert_eq!(stats.user_entries, 0);
    assert_eq!(stats.route_entries, 0);
    assert_eq!(manager.audit().denials_by_reason(DenialReason::UpstreamUnavailable), 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_request_still_populates_cache() {
    let source = Arc::new(
        InstrumentedSource::new(store(&[("u1", &[Role::Fan])])).with_delay(Duration::from_millis(100)),
    );
    let manager = manager(source.clone());

    let request = tokio::spawn({
        let manager = manager.clone();
        async move { manager.authorize(Surface::Edge, Some("u1"), "/fan/dashboard").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    request.abort();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let cached = manager.cache().get_user_data("u1").unwrap();
    assert_eq!(cached.roles, vec![Role::Fan]);
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_unknown_and_inactive_assignments_are_skipped() {
    let roles = store(&[]);
    roles.set_assignments(
        "u1",
        vec![
            RoleAssignment {
                role: "groundskeeper".to_string(),
                team_id: None,
                club_id: None,
                active: true,
            },
            RoleAssignment::new(Role::Coach).for_team("T9").inactive(),
            RoleAssignment::new(Role::Player).for_team("T1"),
        ],
    );
    let manager = manager(roles);

    let context = manager.user_context("u1").await.unwrap();
    assert_eq!(context.roles(), &[Role::Player]);
    assert_eq!(context.team_ids(), &["T1".to_string()]);
    assert!(context.has_role_in_team(Role::Player, "T1"));
    assert!(!context.has_role(Role::Coach));
}

#[tokio::test]
async fn test_role_changes_invalidate_cached_access() {
    let roles = store(&[("u1", &[Role::Fan])]);
    let manager = manager(roles.clone());

    let before = manager.authorize(Surface::Edge, Some("u1"), "/coach/dashboard").await;
    assert_eq!(before.denial().unwrap().reason, DenialReason::InsufficientRole);

    manager
        .assign_role(&*roles, "u1", RoleAssignment::new(Role::Coach).for_team("T1"))
        .await
        .unwrap();
    assert!(manager
        .authorize(Surface::Edge, Some("u1"), "/coach/dashboard")
        .await
        .is_granted());

    assert!(manager.revoke_role(&*roles, "u1", Role::Coach).await.unwrap());
    let after = manager.authorize(Surface::Edge, Some("u1"), "/coach/dashboard").await;
    assert!(!after.is_granted());

    // Nothing removed, nothing invalidated
    let invalidations = manager.cache_stats().invalidations;
    assert!(!manager.revoke_role(&*roles, "u1", Role::Referee).await.unwrap());
    assert_eq!(manager.cache_stats().invalidations, invalidations);
}

#[tokio::test(start_paused = true)]
async fn test_revoke_during_inflight_fetch_is_not_undone() {
    let roles = store(&[("u1", &[Role::Coach])]);
    let source = Arc::new(
        InstrumentedSource::new(Arc::clone(&roles))
            .with_delay_after_read(Duration::from_millis(100)),
    );
    let manager = manager(source.clone());

    let inflight = tokio::spawn({
        let manager = manager.clone();
        async move { manager.authorize(Surface::Edge, Some("u1"), "/coach/dashboard").await }
    });
    // Wait until the fetch has read the coach assignment
    while source.fetches() == 0 {
        tokio::task::yield_now().await;
    }

    assert!(manager.revoke_role(&*roles, "u1", Role::Coach).await.unwrap());
    // The request that started first still sees its snapshot
    assert!(inflight.await.unwrap().is_granted());
    assert!(manager.cache().get_user_data("u1").is_none());

    let after = manager.authorize(Surface::Edge, Some("u1"), "/coach/dashboard").await;
    assert!(!after.is_granted());
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_cached_route_decision_is_served_as_is() {
    let manager = manager(store(&[("u1", &[Role::Coach])]));
    manager.user_context("u1").await.unwrap();
    manager.cache().set_route_access(
        RouteAccessKey::new("u1", "/coach/dashboard", &[Role::Coach]),
        AccessDecision {
            has_access: false,
            access_type: AccessType::RoleSpecific,
            required_roles: Some(vec![Role::SuperAdmin]),
            suggested_redirect: Some("/admin".to_string()),
        },
        Duration::from_secs(60),
    );

    let verdict = manager.authorize(Surface::Server, Some("u1"), "/coach/dashboard").await;
    let denial = verdict.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::InsufficientRole);
    assert_eq!(denial.required_roles, Some(vec![Role::SuperAdmin]));
    assert_eq!(denial.redirect_to, "/admin");
}

#[tokio::test]
async fn test_direct_store_writes_need_explicit_invalidation() {
    let roles = store(&[("u1", &[Role::Fan])]);
    let manager = manager(roles.clone());
    manager.user_context("u1").await.unwrap();

    roles.set_assignments("u1", vec![RoleAssignment::new(Role::Referee)]);
    assert_eq!(manager.user_context("u1").await.unwrap().roles(), &[Role::Fan]);

    manager.invalidate_user("u1");
    assert_eq!(manager.user_context("u1").await.unwrap().roles(), &[Role::Referee]);
}

#[tokio::test]
async fn test_profile_setup_reachable_without_roles() {
    let manager = manager(store(&[("new", &[])]));

    let verdict = manager.authorize(Surface::Edge, Some("new"), "/profile/setup").await;
    assert!(verdict.is_granted());

    let verdict = manager.authorize(Surface::Edge, Some("new"), "/dashboard").await;
    let denial = verdict.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::ProfileSetupRequired);
    assert_eq!(denial.redirect_to, "/profile/setup");
}
