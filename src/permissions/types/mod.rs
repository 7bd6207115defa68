/*!
 * Permission Types Module
 * Core types and traits for the permission system
 */

mod core;
mod traits;
mod user;

pub use self::core::{
    AccessDecision, AccessType, Action, Condition, DenialReason, Permission, PermissionKey,
    Resource, Surface,
};
pub use traits::{PermissionGrant, RoleAssignment, RoleSource, RoleWriter};
pub use user::{ScopedRole, UserContext, UserData};

#[cfg(test)]
pub use traits::MockRoleSource;
