/*!
 * Page placeholders rendered behind the layout guard
 */

use crate::api::state::AppState;
use crate::enforcement::{should_skip, LayoutGuard, MaybeIdentity};
use crate::permissions::UserContext;
use crate::roles::Role;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

fn render(path: &str, context: Option<&UserContext>) -> Html<String> {
    let viewer = match context {
        Some(ctx) => format!(
            "{} ({})",
            ctx.user_id(),
            ctx.primary_role().map_or("no role", |role| role.as_str())
        ),
        None => "guest".to_string(),
    };
    Html(format!("<h1>{path}</h1><p>Signed in as {viewer}</p>"))
}

pub async fn handle_page(
    State(state): State<AppState>,
    identity: MaybeIdentity,
    uri: Uri,
) -> Response {
    if should_skip(uri.path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    LayoutGuard::new(state.manager)
        .render(identity.user_id(), path_and_query(&uri), |ctx| {
            render(uri.path(), ctx)
        })
        .await
        .into_response()
}

/// The coach area layout additionally pins the coach role
pub async fn handle_coach_page(
    State(state): State<AppState>,
    identity: MaybeIdentity,
    uri: Uri,
) -> Response {
    LayoutGuard::new(state.manager)
        .require_any(&[Role::Coach])
        .render(identity.user_id(), path_and_query(&uri), |ctx| {
            render(uri.path(), ctx)
        })
        .await
        .into_response()
}
