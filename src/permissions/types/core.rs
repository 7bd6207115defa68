/*!
 * Permission Types
 * Core types for permission grants and route access decisions
 */

use crate::permissions::policy::ConditionContext;
use crate::roles::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Resource a permission applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Team,
    Club,
    Player,
    Roster,
    Match,
    Training,
    Schedule,
    Stats,
    Message,
    Announcement,
    Report,
    Payment,
    User,
    Role,
    Settings,
    System,
}

/// Action being performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Manage,
    Invite,
    Score,
}

/// Condition gating a permission, checked against the request context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Condition {
    /// Context value must be truthy
    Present { key: String },
    /// Context value must equal `value` exactly
    Equals { key: String, value: Value },
}

impl Condition {
    /// Build from a `{key: value}` map entry; `true` means presence only
    pub fn from_entry(key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        match value {
            Value::Bool(true) => Condition::Present { key },
            value => Condition::Equals { key, value },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Condition::Present { key } | Condition::Equals { key, .. } => key,
        }
    }

    /// Map value this condition serializes to
    pub fn expected(&self) -> Value {
        match self {
            Condition::Present { .. } => Value::Bool(true),
            Condition::Equals { value, .. } => value.clone(),
        }
    }

    pub fn is_satisfied_by(&self, context: &ConditionContext) -> bool {
        match self {
            Condition::Present { key } => context.is_truthy(key),
            Condition::Equals { key, value } => context.get(key) == Some(value),
        }
    }
}

/// Identity of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub resource: Resource,
    pub action: Action,
}

/// A `(resource, action)` grant, optionally gated by conditions.
///
/// Equality and hashing only consider `(resource, action)`; conditions are a
/// secondary filter applied at check time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PermissionRepr", into = "PermissionRepr")]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
    pub conditions: Vec<Condition>,
}

impl Permission {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self {
            resource,
            action,
            conditions: Vec::new(),
        }
    }

    /// Require a truthy context value
    pub fn when(mut self, key: impl Into<String>) -> Self {
        self.conditions.push(Condition::Present { key: key.into() });
        self
    }

    /// Require an exact context value
    pub fn when_eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Equals {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn key(&self) -> PermissionKey {
        PermissionKey {
            resource: self.resource,
            action: self.action,
        }
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Whether this grant applies under `context`. A missing context fails every condition.
    pub fn applies(&self, context: Option<&ConditionContext>) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match context {
            Some(ctx) => self.conditions.iter().all(|c| c.is_satisfied_by(ctx)),
            None => false,
        }
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Permission {}

impl Hash for Permission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Wire shape: `{resource, action, conditions?: {key: value}}`
#[derive(Serialize, Deserialize)]
struct PermissionRepr {
    resource: Resource,
    action: Action,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    conditions: BTreeMap<String, Value>,
}

impl From<PermissionRepr> for Permission {
    fn from(repr: PermissionRepr) -> Self {
        Self {
            resource: repr.resource,
            action: repr.action,
            conditions: repr
                .conditions
                .into_iter()
                .map(|(key, value)| Condition::from_entry(key, value))
                .collect(),
        }
    }
}

impl From<Permission> for PermissionRepr {
    fn from(permission: Permission) -> Self {
        Self {
            resource: permission.resource,
            action: permission.action,
            conditions: permission
                .conditions
                .iter()
                .map(|c| (c.key().to_string(), c.expected()))
                .collect(),
        }
    }
}

/// Rule class that decided a route check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    Public,
    Authenticated,
    RoleSpecific,
    MultiRole,
    /// No rule matched; any authenticated user with a role
    Default,
}

/// Result of a route policy check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub has_access: bool,
    pub access_type: AccessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_redirect: Option<String>,
}

/// Denial category. Distinct in logs and audit, collapsed to three messages for users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No authenticated identity
    LoginRequired,
    /// Identity present, role/permission missing
    InsufficientRole,
    /// Identity present but holds no role at all
    ProfileSetupRequired,
    /// Role lookup failed or timed out; treated as zero roles
    UpstreamUnavailable,
}

impl DenialReason {
    /// Log/audit label
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::LoginRequired => "login_required",
            DenialReason::InsufficientRole => "insufficient_role",
            DenialReason::ProfileSetupRequired => "profile_setup_required",
            DenialReason::UpstreamUnavailable => "upstream_unavailable",
        }
    }

    /// Machine-readable code shown to clients
    pub fn public_code(&self) -> &'static str {
        match self {
            DenialReason::LoginRequired => "login_required",
            DenialReason::InsufficientRole | DenialReason::UpstreamUnavailable => {
                "insufficient_permissions"
            }
            DenialReason::ProfileSetupRequired => "profile_setup_required",
        }
    }

    /// Generic message shown to end users
    pub fn public_message(&self) -> &'static str {
        match self {
            DenialReason::LoginRequired => "Please sign in to continue.",
            DenialReason::InsufficientRole | DenialReason::UpstreamUnavailable => {
                "You don't have permission to access this page."
            }
            DenialReason::ProfileSetupRequired => "Finish setting up your profile to continue.",
        }
    }
}

/// Call site enforcing a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Edge,
    Server,
    Client,
    Api,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Edge => "edge",
            Surface::Server => "server",
            Surface::Client => "client",
            Surface::Api => "api",
        }
    }
}
