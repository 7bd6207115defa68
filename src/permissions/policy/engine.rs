/*!
 * Route Access Policy
 * Maps request paths to rule classes and evaluates them against a user's roles
 */

use super::pattern::{normalize_path, RoutePattern};
use crate::core::errors::ConfigError;
use crate::permissions::types::{AccessDecision, AccessType};
use crate::roles::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Path prefixes owned by a single role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRoutes {
    pub role: Role,
    pub paths: Vec<String>,
}

/// Pattern open to any of several roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRoleRoute {
    pub pattern: String,
    pub roles: Vec<Role>,
}

/// Declarative policy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoutePolicyConfig {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub authenticated: Vec<String>,
    #[serde(default)]
    pub role_routes: Vec<RoleRoutes>,
    #[serde(default)]
    pub multi_role: Vec<MultiRoleRoute>,
    #[serde(default)]
    pub dashboards: BTreeMap<Role, String>,
    pub login_path: String,
    pub profile_setup_path: String,
}

/// Compiled route policy. Immutable; shared by every enforcement surface.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public: Vec<RoutePattern>,
    authenticated: Vec<String>,
    role_routes: Vec<(Role, Vec<RoutePattern>)>,
    multi_role: Vec<(RoutePattern, Vec<Role>)>,
    dashboards: BTreeMap<Role, String>,
    login_path: String,
    profile_setup_path: String,
}

impl RoutePolicy {
    pub fn from_config(config: RoutePolicyConfig) -> Result<Self, ConfigError> {
        let public = config
            .public
            .iter()
            .map(|p| RoutePattern::exact(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut authenticated = Vec::with_capacity(config.authenticated.len());
        for path in &config.authenticated {
            // Authenticated-only routes are exact literals
            let pattern = RoutePattern::exact(path)?;
            if pattern.is_dynamic() {
                return Err(ConfigError::InvalidPattern {
                    pattern: path.clone(),
                    reason: "authenticated-only routes must be literal paths".to_string(),
                });
            }
            authenticated.push(pattern.as_str().to_string());
        }

        let mut role_routes = Vec::with_capacity(config.role_routes.len());
        for entry in &config.role_routes {
            let patterns = entry
                .paths
                .iter()
                .map(|p| RoutePattern::prefix(p))
                .collect::<Result<Vec<_>, _>>()?;
            role_routes.push((entry.role, patterns));
        }

        let mut multi_role = Vec::with_capacity(config.multi_role.len());
        for entry in &config.multi_role {
            if entry.roles.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("multi_role[{}]", entry.pattern),
                    reason: "at least one role must be allowed".to_string(),
                });
            }
            multi_role.push((RoutePattern::exact(&entry.pattern)?, entry.roles.clone()));
        }

        for (key, path) in [
            ("login_path", &config.login_path),
            ("profile_setup_path", &config.profile_setup_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("'{}' is not an absolute path", path),
                });
            }
        }

        Ok(Self {
            public,
            authenticated,
            role_routes,
            multi_role,
            dashboards: config.dashboards,
            login_path: config.login_path,
            profile_setup_path: config.profile_setup_path,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RoutePolicyConfig = serde_json::from_str(json).map_err(|source| {
            ConfigError::Parse {
                what: "route policy",
                source,
            }
        })?;
        Self::from_config(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Evaluate a pathname against the rule classes in fixed order; first match wins
    pub fn check_access(&self, pathname: &str, roles: &[Role]) -> AccessDecision {
        let path = normalize_path(pathname);
        let authenticated = !roles.is_empty();

        if self.public.iter().any(|p| p.matches(path)) {
            return AccessDecision {
                has_access: true,
                access_type: AccessType::Public,
                required_roles: None,
                suggested_redirect: None,
            };
        }

        if self.authenticated.iter().any(|p| p == path) {
            return self.decide(authenticated, AccessType::Authenticated, None, roles);
        }

        for (role, patterns) in &self.role_routes {
            if patterns.iter().any(|p| p.matches(path)) {
                debug!(path, role = %role, "role-specific route");
                return self.decide(
                    roles.contains(role),
                    AccessType::RoleSpecific,
                    Some(vec![*role]),
                    roles,
                );
            }
        }

        for (pattern, allowed) in &self.multi_role {
            if pattern.matches(path) {
                let has_access = roles.iter().any(|r| allowed.contains(r));
                return self.decide(has_access, AccessType::MultiRole, Some(allowed.clone()), roles);
            }
        }

        // Unlisted pages are protected, never silently public
        self.decide(authenticated, AccessType::Default, None, roles)
    }

    fn decide(
        &self,
        has_access: bool,
        access_type: AccessType,
        required_roles: Option<Vec<Role>>,
        roles: &[Role],
    ) -> AccessDecision {
        AccessDecision {
            has_access,
            access_type,
            required_roles,
            suggested_redirect: (!has_access).then(|| self.redirect_for(roles).to_string()),
        }
    }

    /// Where to send a denied user: their primary role's dashboard, or profile setup
    pub fn redirect_for(&self, roles: &[Role]) -> &str {
        match roles.first() {
            Some(role) => self.dashboard_for(*role),
            None => &self.profile_setup_path,
        }
    }

    pub fn dashboard_for(&self, role: Role) -> &str {
        self.dashboards
            .get(&role)
            .map(String::as_str)
            .unwrap_or(self.profile_setup_path.as_str())
    }

    pub fn is_public(&self, pathname: &str) -> bool {
        let path = normalize_path(pathname);
        self.public.iter().any(|p| p.matches(path))
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn profile_setup_path(&self) -> &str {
        &self.profile_setup_path
    }
}
