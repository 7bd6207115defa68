/*!
 * API Types
 * Request/response bodies and the error type for the HTTP API
 */

use crate::core::errors::{FetchError, InviteError};
use crate::enforcement::ApiError;
use crate::permissions::{CacheStats, UserContext};
use crate::roles::{Role, UnknownRole};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// API operation result
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by API handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Access(#[from] ApiError),

    #[error("Role store unavailable: {0}")]
    Store(#[from] FetchError),

    #[error(transparent)]
    Invite(#[from] InviteError),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Access(err) => return err.clone().into_response(),
            AppError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            AppError::Invite(InviteError::NotFound) => (StatusCode::NOT_FOUND, "invite_not_found"),
            AppError::Invite(_) => (StatusCode::BAD_REQUEST, "invalid_invite_code"),
            AppError::UnknownRole(_) => (StatusCode::BAD_REQUEST, "unknown_role"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "API request failed");
        }
        let body = ErrorBody {
            error,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /api/me`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub roles: Vec<Role>,
    pub primary_role: Option<Role>,
    pub team_ids: Vec<String>,
    pub club_ids: Vec<String>,
    pub dashboard: String,
    pub permissions: Vec<crate::permissions::Permission>,
}

impl MeResponse {
    pub fn new(context: &UserContext, dashboard: &str) -> Self {
        Self {
            user_id: context.user_id().to_string(),
            roles: context.roles().to_vec(),
            primary_role: context.primary_role(),
            team_ids: context.team_ids().to_vec(),
            club_ids: context.club_ids().to_vec(),
            dashboard: dashboard.to_string(),
            permissions: context.permissions().iter().cloned().collect(),
        }
    }
}

/// `POST /api/access/check`. Roles default to the caller's own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckRequest {
    pub pathname: String,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

/// `POST /api/admin/users/{id}/roles` and `DELETE .../roles/{role}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeResponse {
    pub user_id: String,
    pub changed: bool,
    pub roles: Vec<Role>,
}

/// `GET /api/admin/cache/stats`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache: CacheStats,
    pub audit: crate::permissions::AuditStats,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl ServerConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self { address }
    }
}
