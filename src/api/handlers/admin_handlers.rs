/*!
 * Admin handlers: cache inspection and role assignment changes
 */

use crate::api::state::AppState;
use crate::api::types::{AppResult, RoleChangeResponse, StatsResponse};
use crate::enforcement::Authorized;
use crate::permissions::{Action, Resource, RoleAssignment};
use crate::roles::Role;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

pub async fn handle_cache_stats(
    State(state): State<AppState>,
    auth: Authorized,
) -> AppResult<Json<StatsResponse>> {
    auth.require_any_role(ADMIN_ROLES)?;
    Ok(Json(StatsResponse {
        cache: state.manager.cache_stats(),
        audit: state.manager.audit_stats(),
    }))
}

pub async fn handle_invalidate_user(
    State(state): State<AppState>,
    auth: Authorized,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    auth.require_any_role(ADMIN_ROLES)?;
    state.manager.invalidate_user(&user_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_assign_role(
    State(state): State<AppState>,
    auth: Authorized,
    Path(user_id): Path<String>,
    Json(assignment): Json<RoleAssignment>,
) -> AppResult<Json<RoleChangeResponse>> {
    auth.require_permission(Resource::Role, Action::Manage, None)?;
    let role: Role = assignment.role.parse()?;

    info!(by = auth.user_id(), user_id = %user_id, role = %role, "assigning role");
    state
        .manager
        .assign_role(&*state.store, &user_id, assignment)
        .await?;

    role_change(&state, user_id, true).await
}

pub async fn handle_revoke_role(
    State(state): State<AppState>,
    auth: Authorized,
    Path((user_id, role)): Path<(String, String)>,
) -> AppResult<Json<RoleChangeResponse>> {
    auth.require_permission(Resource::Role, Action::Manage, None)?;
    let role: Role = role.parse()?;

    info!(by = auth.user_id(), user_id = %user_id, role = %role, "revoking role");
    let removed = state
        .manager
        .revoke_role(&*state.store, &user_id, role)
        .await?;

    role_change(&state, user_id, removed).await
}

async fn role_change(
    state: &AppState,
    user_id: String,
    changed: bool,
) -> AppResult<Json<RoleChangeResponse>> {
    let context = state.manager.user_context(&user_id).await?;
    Ok(Json(RoleChangeResponse {
        roles: context.roles().to_vec(),
        user_id,
        changed,
    }))
}
