/*!
 * End-to-end role scenarios and unrelated writes
 */

use crate::common::{manager, store};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use pitch_guard::enforcement::{redirect_target, IDENTITY_HEADER};
use pitch_guard::permissions::{AccessType, DenialReason, Surface};
use pitch_guard::{router, AppState, InviteCode, Role};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

#[test]
fn test_roleless_user_on_coach_dashboard() {
    let manager = manager(store(&[]));
    let decision = manager.check_access("/coach/dashboard", &[]);

    assert!(!decision.has_access);
    assert_eq!(decision.suggested_redirect.as_deref(), Some("/profile/setup"));
}

#[test]
fn test_parent_on_team_page() {
    let manager = manager(store(&[]));
    let decision = manager.check_access("/team/T1", &[Role::Parent]);

    assert!(decision.has_access);
    assert_eq!(decision.access_type, AccessType::MultiRole);
}

#[test]
fn test_referee_on_coach_dashboard() {
    let manager = manager(store(&[]));
    let decision = manager.check_access("/coach/dashboard", &[Role::Referee]);

    assert!(!decision.has_access);
    assert_eq!(decision.required_roles, Some(vec![Role::Coach]));
    assert_eq!(decision.suggested_redirect.as_deref(), Some("/referee/dashboard"));
}

#[tokio::test]
async fn test_invite_writes_never_invalidate() {
    let roles = store(&[("coach", &[Role::Coach])]);
    roles.set_assignments(
        "coach",
        vec![pitch_guard::RoleAssignment::new(Role::Coach).for_team("T1")],
    );
    let manager = manager(roles.clone());
    let app = router(AppState::new(manager.clone(), roles.clone()));

    manager.user_context("coach").await.unwrap();
    let before = manager.cache_stats();
    assert_eq!(before.user_entries, 1);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/teams/T1/invites")
        .header(IDENTITY_HEADER, "coach")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let invite: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let code = invite["code"].as_str().unwrap().to_string();
    assert!(InviteCode::parse(&code).is_ok());

    // Anyone may look a code up, in any case
    let request = Request::builder()
        .uri(format!("/api/invites/{}", code.to_lowercase()))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(request).await.unwrap().status(), StatusCode::OK);

    roles.create_invite("T1", "coach");
    assert!(roles.validate_invite("ZZZZ2222").is_err());

    let after = manager.cache_stats();
    assert_eq!(after.invalidations, before.invalidations);
    assert!(manager.cache().get_user_data("coach").is_some());
}

#[tokio::test]
async fn test_invites_limited_to_own_team() {
    let roles = store(&[]);
    roles.set_assignments(
        "coach",
        vec![pitch_guard::RoleAssignment::new(Role::Coach).for_team("T1")],
    );
    let app = router(AppState::new(manager(roles.clone()), roles));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/teams/T2/invites")
        .header(IDENTITY_HEADER, "coach")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.oneshot(request).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_store_outage_denies_until_recovery() {
    let roles = store(&[("coach", &[Role::Coach])]);
    let manager = manager(roles.clone());

    roles.set_offline(true);
    let verdict = manager.authorize(Surface::Edge, Some("coach"), "/coach/dashboard").await;
    let denial = verdict.denial().unwrap().clone();
    assert_eq!(denial.reason, DenialReason::UpstreamUnavailable);
    assert_eq!(
        redirect_target(&denial, "/coach/dashboard"),
        "/profile/setup?error=insufficient_permissions"
    );

    roles.set_offline(false);
    assert!(manager
        .authorize(Surface::Edge, Some("coach"), "/coach/dashboard")
        .await
        .is_granted());
}
