/*!
 * Permissions Module
 * Permission resolution, route policy, caching and audit for every enforcement surface
 *
 * ## Usage
 * ```ignore
 * use pitch_guard::permissions::{AccessManager, Surface};
 *
 * let verdict = manager.authorize(Surface::Api, Some("user-1"), "/team/T1").await;
 * if let Some(denial) = verdict.denial() {
 *     tracing::info!(reason = denial.reason.as_str(), "denied");
 * }
 * ```
 */

pub mod audit;
pub mod cache;
pub mod manager;
pub mod policy;
pub mod resolver;
pub mod types;

pub use audit::{AuditEvent, AuditLogger, AuditSeverity, AuditStats};
pub use cache::{AccessCache, CacheStats, CleanupTask, RouteAccessKey};
pub use manager::{AccessManager, Denial, Grant, Verdict};
pub use policy::{normalize_path, ConditionContext, RoutePattern, RoutePolicy, RoutePolicyConfig};
pub use resolver::{has_permission, PermissionResolver, PermissionSet};
pub use types::{
    AccessDecision, AccessType, Action, Condition, DenialReason, Permission, PermissionGrant,
    PermissionKey, Resource, RoleAssignment, RoleSource, RoleWriter, ScopedRole, Surface,
    UserContext, UserData,
};
