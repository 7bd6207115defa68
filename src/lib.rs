/*!
 * Pitch Guard Library
 * Role hierarchy, permission resolution, access caching and route protection
 * for a grassroots football team manager
 */

pub mod api;
pub mod core;
pub mod enforcement;
pub mod monitoring;
pub mod permissions;
pub mod roles;
pub mod store;

// Re-exports
pub use self::core::{AccessConfig, ConfigError, FetchError, GuardError, GuardResult, InviteError};
pub use api::{router, AppState};
pub use enforcement::{
    edge_guard, header_identity, ApiError, Authorized, ClientGuard, ClientView, Identity,
    LayoutGuard, PageOutcome,
};
pub use monitoring::init_tracing;
pub use permissions::{
    AccessCache, AccessDecision, AccessManager, AccessType, Action, CacheStats, CleanupTask,
    DenialReason, Permission, PermissionResolver, PermissionSet, Resource, RoleAssignment,
    RoleSource, RoleWriter, RoutePolicy, Surface, UserContext, Verdict,
};
pub use roles::{Role, RoleDefinition, RoleHierarchy};
pub use store::{Invite, InviteCode, MemoryRoleStore};
