/*!
 * Permission Traits
 * Interfaces to the external persistence collaborator
 */

use crate::core::errors::FetchError;
use crate::core::types::{ClubId, TeamId};
use crate::permissions::types::Permission;
use crate::roles::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A role assignment as stored by the persistence layer.
///
/// `role` stays a raw string: the store may hold names this build does not
/// know, which resolve to zero permissions instead of failing the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<ClubId>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RoleAssignment {
    pub fn new(role: Role) -> Self {
        Self {
            role: role.as_str().to_string(),
            team_id: None,
            club_id: None,
            active: true,
        }
    }

    pub fn for_team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn for_club(mut self, club_id: impl Into<ClubId>) -> Self {
        self.club_id = Some(club_id.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Extra permission declared for a role by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub role: Role,
    pub permission: Permission,
}

/// Source of role data for authenticated users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// All role assignments for a user, active or not
    async fn fetch_role_assignments(&self, user_id: &str) -> Result<Vec<RoleAssignment>, FetchError>;

    /// Additional grants for the given roles on top of the static hierarchy
    async fn fetch_permission_grants(&self, _roles: &[Role]) -> Result<Vec<PermissionGrant>, FetchError> {
        Ok(Vec::new())
    }
}

/// Write side of the role store. Changes go through `AccessManager` so cached
/// decisions for the user are dropped.
#[async_trait]
pub trait RoleWriter: Send + Sync {
    async fn assign_role(&self, user_id: &str, assignment: RoleAssignment) -> Result<(), FetchError>;

    /// Returns whether anything was removed
    async fn revoke_role(&self, user_id: &str, role: Role) -> Result<bool, FetchError>;
}
