/*!
 * User Access Data
 * Resolved per-user roles and permissions, and the immutable request context built on them
 */

use crate::core::types::{ClubId, TeamId, UserId};
use crate::permissions::policy::ConditionContext;
use crate::permissions::resolver::PermissionSet;
use crate::permissions::types::{Action, Resource};
use crate::roles::Role;
use serde::Serialize;
use std::sync::Arc;

/// A known role together with the team/club it was granted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedRole {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<ClubId>,
}

/// Cached role/permission data for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserData {
    /// Distinct roles in assignment order; the first is the primary role
    pub roles: Vec<Role>,
    pub permissions: PermissionSet,
    pub assignments: Vec<ScopedRole>,
    pub active_teams: Vec<TeamId>,
    pub active_clubs: Vec<ClubId>,
}

/// Per-request view of an authenticated user. Never mutated; role changes build a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserContext {
    user_id: UserId,
    #[serde(flatten)]
    data: Arc<UserData>,
}

impl UserContext {
    pub fn new(user_id: impl Into<UserId>, data: Arc<UserData>) -> Self {
        Self {
            user_id: user_id.into(),
            data,
        }
    }

    /// Authenticated identity with nothing resolved
    pub fn without_roles(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, Arc::new(UserData::default()))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn data(&self) -> &Arc<UserData> {
        &self.data
    }

    pub fn roles(&self) -> &[Role] {
        &self.data.roles
    }

    pub fn primary_role(&self) -> Option<Role> {
        self.data.roles.first().copied()
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.data.permissions
    }

    pub fn team_ids(&self) -> &[TeamId] {
        &self.data.active_teams
    }

    pub fn club_ids(&self) -> &[ClubId] {
        &self.data.active_clubs
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.data.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    /// Whether `role` was assigned for `team_id` specifically
    pub fn has_role_in_team(&self, role: Role, team_id: &str) -> bool {
        self.data
            .assignments
            .iter()
            .any(|a| a.role == role && a.team_id.as_deref() == Some(team_id))
    }

    pub fn has_permission(
        &self,
        resource: Resource,
        action: Action,
        context: Option<&ConditionContext>,
    ) -> bool {
        self.data.permissions.allows(resource, action, context)
    }
}
