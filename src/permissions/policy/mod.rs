/*!
 * Policy Module
 * Route access policy, path patterns and condition context
 */

mod context;
mod defaults;
mod engine;
mod pattern;

pub use context::ConditionContext;
pub use defaults::{LOGIN_PATH, PROFILE_SETUP_PATH};
pub use engine::{MultiRoleRoute, RoleRoutes, RoutePolicy, RoutePolicyConfig};
pub use pattern::{normalize_path, MatchMode, RoutePattern};
