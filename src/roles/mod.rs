/*!
 * Roles
 * Role set, definitions and the validated inheritance hierarchy
 */

mod defaults;
pub mod hierarchy;
pub mod types;

pub use hierarchy::{HierarchyDocument, RoleHierarchy, RoleHierarchyBuilder};
pub use types::{Role, RoleDefinition, UnknownRole};
