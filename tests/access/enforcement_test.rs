/*!
 * Enforcement surfaces over HTTP: edge redirects, layout guards and API status codes
 */

use crate::common::{manager, store};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pitch_guard::enforcement::IDENTITY_HEADER;
use pitch_guard::{router, AppState, MemoryRoleStore, Role};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(roles: Arc<MemoryRoleStore>) -> Router {
    router(AppState::new(manager(roles.clone()), roles))
}

fn seeded() -> Router {
    app(store(&[
        ("coach", &[Role::Coach]),
        ("referee", &[Role::Referee]),
        ("fan", &[Role::Fan]),
        ("admin", &[Role::Admin]),
        ("newbie", &[]),
    ]))
}

async fn send(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header(IDENTITY_HEADER, user);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> Response {
    send(app, Method::GET, uri, user, None).await
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_edge_sends_anonymous_to_login_with_return_url() {
    let app = seeded();
    let response = get(&app, "/coach/dashboard?tab=squad", None).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/login?returnUrl=%2Fcoach%2Fdashboard%3Ftab%3Dsquad"
    );
}

#[tokio::test]
async fn test_edge_sends_wrong_role_to_own_dashboard() {
    let app = seeded();
    let response = get(&app, "/coach/dashboard", Some("referee")).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/referee/dashboard?error=insufficient_permissions"
    );
}

#[tokio::test]
async fn test_edge_sends_roleless_user_to_profile_setup() {
    let app = seeded();
    let response = get(&app, "/coach/dashboard", Some("newbie")).await;
    assert_eq!(location(&response), "/profile/setup");

    let setup = get(&app, "/profile/setup", Some("newbie")).await;
    assert_eq!(setup.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_granted_pages_render() {
    let app = seeded();

    let response = get(&app, "/coach/dashboard", Some("coach")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("coach (coach)"), "{body}");

    let public = get(&app, "/about", None).await;
    assert_eq!(public.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_assets_bypass_the_edge() {
    let app = seeded();
    for path in ["/favicon.ico", "/_next/static/app.js", "/images/crest.png"] {
        let response = get(&app, path, None).await;
        assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
    }
}

#[tokio::test]
async fn test_api_without_identity_is_401() {
    let app = seeded();
    let response = get(&app, "/api/me", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "login_required");
}

#[tokio::test]
async fn test_api_me() {
    let app = seeded();
    let response = get(&app, "/api/me", Some("fan")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["userId"], "fan");
    assert_eq!(body["roles"], json!(["fan"]));
    assert_eq!(body["dashboard"], "/fan/dashboard");
}

#[tokio::test]
async fn test_api_role_gate_is_403_with_required_roles() {
    let app = seeded();
    let response = get(&app, "/api/admin/cache/stats", Some("fan")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], "insufficient_permissions");
    assert_eq!(body["requiredRoles"], json!(["admin", "super_admin"]));

    let response = get(&app, "/api/admin/cache/stats", Some("admin")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["cache"]["user_entries"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_api_access_check() {
    let app = seeded();
    let response = send(
        &app,
        Method::POST,
        "/api/access/check",
        Some("fan"),
        Some(json!({ "pathname": "/coach/dashboard", "roles": ["referee"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "hasAccess": false,
            "accessType": "role_specific",
            "requiredRoles": ["coach"],
            "suggestedRedirect": "/referee/dashboard"
        })
    );
}

#[tokio::test]
async fn test_admin_role_assignment_takes_effect_immediately() {
    let app = seeded();

    let before = get(&app, "/coach/dashboard", Some("fan")).await;
    assert_eq!(before.status(), StatusCode::TEMPORARY_REDIRECT);

    let response = send(
        &app,
        Method::POST,
        "/api/admin/users/fan/roles",
        Some("admin"),
        Some(json!({ "role": "coach", "team_id": "T1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["roles"], json!(["fan", "coach"]));

    // Primary role is still fan, but coach pages now open
    let after = get(&app, "/coach/dashboard", Some("fan")).await;
    assert_eq!(after.status(), StatusCode::OK);

    let response = send(&app, Method::DELETE, "/api/admin/users/fan/roles/coach", Some("admin"), None).await;
    assert_eq!(json_body(response).await["changed"], true);
    let revoked = get(&app, "/coach/dashboard", Some("fan")).await;
    assert_eq!(revoked.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_role_assignment_requires_role_management() {
    let app = seeded();
    let response = send(
        &app,
        Method::POST,
        "/api/admin/users/fan/roles",
        Some("coach"),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        Method::POST,
        "/api/admin/users/fan/roles",
        Some("admin"),
        Some(json!({ "role": "groundskeeper" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "unknown_role");
}
