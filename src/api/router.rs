/*!
 * HTTP Router
 * API routes guard themselves; page routes sit behind the edge interceptor
 */

use super::handlers::{account_handlers, admin_handlers, invite_handlers, page_handlers};
use super::state::AppState;
use crate::enforcement::{edge_guard, header_identity};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/me", get(account_handlers::handle_me))
        .route("/api/access/check", post(account_handlers::handle_check_access))
        .route("/api/admin/cache/stats", get(admin_handlers::handle_cache_stats))
        .route(
            "/api/admin/users/{id}/invalidate",
            post(admin_handlers::handle_invalidate_user),
        )
        .route("/api/admin/users/{id}/roles", post(admin_handlers::handle_assign_role))
        .route(
            "/api/admin/users/{id}/roles/{role}",
            delete(admin_handlers::handle_revoke_role),
        )
        .route(
            "/api/teams/{team_id}/invites",
            post(invite_handlers::handle_create_invite),
        )
        .route("/api/invites/{code}", get(invite_handlers::handle_lookup_invite));

    let pages = Router::new()
        .route("/coach", get(page_handlers::handle_coach_page))
        .route("/coach/{*rest}", get(page_handlers::handle_coach_page))
        .fallback(page_handlers::handle_page)
        .layer(middleware::from_fn_with_state(
            state.manager.clone(),
            edge_guard,
        ));

    api.merge(pages)
        .layer(middleware::from_fn(header_identity))
        .with_state(state)
}
