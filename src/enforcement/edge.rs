/*!
 * Edge Interceptor
 * Middleware that enforces the route policy before any page handler runs
 */

use super::identity::Identity;
use super::state::{redirect_target, AccessCheck};
use crate::permissions::{AccessManager, Surface, Verdict};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

/// Prefixes never intercepted: framework assets and API routes, which guard themselves
const SKIPPED_PREFIXES: &[&str] = &["/_next/", "/static/", "/api/"];

/// Paths the interceptor leaves alone
pub fn should_skip(path: &str) -> bool {
    if path == "/favicon.ico" || path == "/api" {
        return true;
    }
    if SKIPPED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    // Static files: last segment has an extension
    path.rsplit('/')
        .next()
        .is_some_and(|segment| segment.rfind('.').is_some_and(|dot| dot > 0 && dot + 1 < segment.len()))
}

/// Axum middleware; install with `middleware::from_fn_with_state(manager, edge_guard)`
pub async fn edge_guard(
    State(manager): State<AccessManager>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if should_skip(&path) {
        return next.run(request).await;
    }

    let user_id = request
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.0.clone());
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let mut check = AccessCheck::new(Surface::Edge);
    match check.run(&manager, user_id.as_deref(), &path).await {
        Verdict::Granted(_) => next.run(request).await,
        Verdict::Denied(denial) => {
            let target = redirect_target(&denial, &path_and_query);
            debug!(path = %path, target = %target, "edge redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
