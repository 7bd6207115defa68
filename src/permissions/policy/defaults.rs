/*!
 * Default Route Policy
 * Route table for the football team manager pages
 */

use super::engine::{MultiRoleRoute, RoleRoutes, RoutePolicy, RoutePolicyConfig};
use crate::core::errors::ConfigError;
use crate::roles::Role;

pub const LOGIN_PATH: &str = "/login";
pub const PROFILE_SETUP_PATH: &str = "/profile/setup";

const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/auth/callback",
    "/about",
    "/features",
    "/pricing",
    "/contact",
    "/privacy",
    "/terms",
    "/invite/[code]",
    "/api/invites/[code]",
    "/matches/[matchId]/live",
];

const AUTHENTICATED_ROUTES: &[&str] = &[
    "/dashboard",
    "/profile",
    "/settings",
    "/notifications",
    "/onboarding",
];

impl RoutePolicyConfig {
    pub fn football_defaults() -> Self {
        let owned = |paths: &[&str]| paths.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        let role_prefix = |role: Role, path: &str| RoleRoutes {
            role,
            paths: vec![path.to_string()],
        };
        let multi = |pattern: &str, roles: &[Role]| MultiRoleRoute {
            pattern: pattern.to_string(),
            roles: roles.to_vec(),
        };

        Self {
            public: owned(PUBLIC_ROUTES),
            authenticated: owned(AUTHENTICATED_ROUTES),
            role_routes: vec![
                role_prefix(Role::Coach, "/coach"),
                role_prefix(Role::AssistantCoach, "/assistant-coach"),
                role_prefix(Role::Parent, "/parent"),
                role_prefix(Role::Player, "/player"),
                role_prefix(Role::Fan, "/fan"),
                role_prefix(Role::Referee, "/referee"),
                role_prefix(Role::ClubOfficial, "/club"),
                role_prefix(Role::Admin, "/admin"),
                role_prefix(Role::SuperAdmin, "/super-admin"),
            ],
            multi_role: vec![
                multi(
                    "/team/[teamId]",
                    &[Role::Coach, Role::AssistantCoach, Role::Parent, Role::Player],
                ),
                multi("/team/[teamId]/roster", &[Role::Coach, Role::AssistantCoach]),
                multi(
                    "/team/[teamId]/schedule",
                    &[Role::Coach, Role::AssistantCoach, Role::Parent, Role::Player],
                ),
                multi(
                    "/team/[teamId]/training",
                    &[Role::Coach, Role::AssistantCoach, Role::Player],
                ),
                multi(
                    "/messages",
                    &[Role::Coach, Role::AssistantCoach, Role::Parent, Role::Player],
                ),
                multi("/matches/[matchId]/report", &[Role::Referee, Role::Coach]),
                multi(
                    "/clubs/[clubId]",
                    &[Role::ClubOfficial, Role::Admin, Role::SuperAdmin],
                ),
            ],
            dashboards: Role::ALL
                .iter()
                .map(|role| (*role, default_dashboard(*role).to_string()))
                .collect(),
            login_path: LOGIN_PATH.to_string(),
            profile_setup_path: PROFILE_SETUP_PATH.to_string(),
        }
    }
}

fn default_dashboard(role: Role) -> &'static str {
    match role {
        Role::Coach => "/coach/dashboard",
        Role::AssistantCoach => "/assistant-coach/dashboard",
        Role::Parent => "/parent/dashboard",
        Role::Player => "/player/dashboard",
        Role::Fan => "/fan/dashboard",
        Role::Referee => "/referee/dashboard",
        Role::ClubOfficial => "/club/dashboard",
        Role::Admin => "/admin/dashboard",
        Role::SuperAdmin => "/super-admin/dashboard",
    }
}

impl RoutePolicy {
    pub fn football_defaults() -> Result<Self, ConfigError> {
        Self::from_config(RoutePolicyConfig::football_defaults())
    }
}
