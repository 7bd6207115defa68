/*!
 * Invite handlers. Invite writes never touch cached access.
 */

use crate::api::state::AppState;
use crate::api::types::AppResult;
use crate::enforcement::{ApiError, Authorized};
use crate::permissions::{Action, DenialReason, Resource};
use crate::roles::Role;
use crate::store::Invite;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Roles that may invite into any team, not only their own
const CLUB_WIDE_ROLES: &[Role] = &[Role::ClubOfficial, Role::Admin, Role::SuperAdmin];

pub async fn handle_create_invite(
    State(state): State<AppState>,
    auth: Authorized,
    Path(team_id): Path<String>,
) -> AppResult<(StatusCode, Json<Invite>)> {
    auth.require_permission(Resource::Player, Action::Invite, None)?;
    if !auth.team_ids().contains(&team_id) && !auth.has_any_role(CLUB_WIDE_ROLES) {
        return Err(ApiError::Forbidden {
            reason: DenialReason::InsufficientRole,
            required_roles: None,
        }
        .into());
    }

    let invite = state.store.create_invite(team_id, auth.user_id());
    Ok((StatusCode::CREATED, Json(invite)))
}

pub async fn handle_lookup_invite(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Invite>> {
    Ok(Json(state.store.validate_invite(&code)?))
}
