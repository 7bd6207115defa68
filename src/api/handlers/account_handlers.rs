/*!
 * Account handlers: the caller's own roles and route checks
 */

use crate::api::state::AppState;
use crate::api::types::{AccessCheckRequest, MeResponse};
use crate::enforcement::Authorized;
use crate::permissions::AccessDecision;
use axum::{extract::State, Json};

pub async fn handle_me(State(state): State<AppState>, auth: Authorized) -> Json<MeResponse> {
    let dashboard = state.manager.policy().redirect_for(auth.roles());
    Json(MeResponse::new(auth.context(), dashboard))
}

pub async fn handle_check_access(
    State(state): State<AppState>,
    auth: Authorized,
    Json(request): Json<AccessCheckRequest>,
) -> Json<AccessDecision> {
    let roles = request.roles.unwrap_or_else(|| auth.roles().to_vec());
    Json(state.manager.check_access(&request.pathname, &roles))
}
