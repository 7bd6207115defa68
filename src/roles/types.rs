/*!
 * Role Types
 * The closed role set and declarative role definitions
 */

use crate::permissions::types::Permission;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role a user can hold. Closed set; unknown strings never become roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coach,
    AssistantCoach,
    Parent,
    Player,
    Fan,
    Referee,
    ClubOfficial,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Coach,
        Role::AssistantCoach,
        Role::Parent,
        Role::Player,
        Role::Fan,
        Role::Referee,
        Role::ClubOfficial,
        Role::Admin,
        Role::SuperAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coach => "coach",
            Role::AssistantCoach => "assistant_coach",
            Role::Parent => "parent",
            Role::Player => "player",
            Role::Fan => "fan",
            Role::Referee => "referee",
            Role::ClubOfficial => "club_official",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Declarative definition of one role: what it grants directly and whom it inherits from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: Role,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Direct parents, in traversal order
    #[serde(default)]
    pub inherits: Vec<Role>,
}

impl RoleDefinition {
    pub fn new(name: Role) -> Self {
        Self {
            name,
            permissions: Vec::new(),
            inherits: Vec::new(),
        }
    }

    pub fn grant(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn inherit(mut self, parent: Role) -> Self {
        self.inherits.push(parent);
        self
    }
}
