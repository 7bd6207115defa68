/*!
 * API Guard
 * 401/403 JSON rejections and the `Authorized` extractor for protected handlers
 */

use super::identity::Identity;
use crate::permissions::{
    AccessManager, Action, AuditEvent, ConditionContext, Denial, DenialReason, Resource, Surface,
    UserContext, Verdict,
};
use crate::roles::Role;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::ops::Deref;
use thiserror::Error;
use tracing::warn;

/// Rejection returned by protected API handlers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No authenticated identity
    #[error("authentication required")]
    Unauthorized,
    /// Identity present but lacking role or permission
    #[error("forbidden: {}", .reason.as_str())]
    Forbidden {
        reason: DenialReason,
        required_roles: Option<Vec<Role>>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_roles: Option<&'a [Role]>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn reason(&self) -> DenialReason {
        match self {
            ApiError::Unauthorized => DenialReason::LoginRequired,
            ApiError::Forbidden { reason, .. } => *reason,
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial.reason {
            DenialReason::LoginRequired => ApiError::Unauthorized,
            reason => ApiError::Forbidden {
                reason,
                required_roles: denial.required_roles,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let reason = self.reason();
        let required_roles = match &self {
            ApiError::Forbidden { required_roles, .. } => required_roles.as_deref(),
            ApiError::Unauthorized => None,
        };
        let body = ErrorBody {
            error: reason.public_code(),
            message: reason.public_message(),
            required_roles,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Authenticated, policy-checked caller of an API route
pub struct Authorized {
    context: UserContext,
    manager: AccessManager,
    path: String,
}

impl Authorized {
    pub fn context(&self) -> &UserContext {
        &self.context
    }

    pub fn into_context(self) -> UserContext {
        self.context
    }

    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        self.require_any_role(&[role])
    }

    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        self.manager
            .require_any_role(Surface::Api, &self.context, &self.path, roles)
            .map_err(ApiError::from)
    }

    pub fn require_permission(
        &self,
        resource: Resource,
        action: Action,
        condition: Option<&ConditionContext>,
    ) -> Result<(), ApiError> {
        if self.context.has_permission(resource, action, condition) {
            return Ok(());
        }

        let reason = if self.context.roles().is_empty() {
            DenialReason::ProfileSetupRequired
        } else {
            DenialReason::InsufficientRole
        };
        self.manager.audit().log(AuditEvent::denied(
            Surface::Api,
            self.path.as_str(),
            Some(self.context.user_id()),
            None,
            reason,
        ));
        Err(ApiError::Forbidden {
            reason,
            required_roles: None,
        })
    }
}

impl Deref for Authorized {
    type Target = UserContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
    AccessManager: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let manager = AccessManager::from_ref(state);
        let identity = Identity::from_parts(parts);
        let user_id = identity.as_ref().map(Identity::user_id);
        let path = parts.uri.path().to_string();

        let context = match manager.authorize(Surface::Api, user_id, &path).await {
            Verdict::Granted(grant) => match (grant.context, user_id) {
                (Some(context), _) => context,
                // Public API route: still needs an identity to produce a caller
                (None, Some(user_id)) => manager
                    .user_context(user_id)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(user_id, error = %e, "role lookup failed on public API route");
                        UserContext::without_roles(user_id)
                    }),
                (None, None) => return Err(ApiError::Unauthorized),
            },
            Verdict::Denied(denial) => return Err(denial.into()),
        };

        Ok(Authorized {
            context,
            manager,
            path,
        })
    }
}
