/*!
 * Permission Resolver
 * Expands a role set through the hierarchy into a closed permission set
 *
 * Each role is visited at most once per resolution, so diamond inheritance
 * (coach and assistant_coach both reaching parent and fan) contributes the
 * shared ancestor's grants exactly once.
 */

use crate::permissions::policy::ConditionContext;
use crate::permissions::types::{Action, Permission, PermissionKey, Resource};
use crate::roles::{Role, RoleHierarchy};
use ahash::HashSet;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Resolved permissions keyed by `(resource, action)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionSet {
    grants: BTreeMap<PermissionKey, Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a grant. An unconditioned grant replaces a conditioned one for the
    /// same pair; otherwise the grant already present is kept.
    ///
    /// Returns true if the set changed.
    pub fn insert(&mut self, permission: Permission) -> bool {
        let key = permission.key();
        match self.grants.get(&key) {
            None => {
                self.grants.insert(key, permission);
                true
            }
            Some(existing) if existing.is_conditional() && !permission.is_conditional() => {
                self.grants.insert(key, permission);
                true
            }
            Some(_) => false,
        }
    }

    pub fn get(&self, resource: Resource, action: Action) -> Option<&Permission> {
        self.grants.get(&PermissionKey { resource, action })
    }

    /// Whether the pair is present at all, ignoring conditions
    pub fn contains(&self, resource: Resource, action: Action) -> bool {
        self.get(resource, action).is_some()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.grants.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = PermissionKey> + '_ {
        self.grants.keys().copied()
    }

    pub fn is_superset(&self, other: &PermissionSet) -> bool {
        other.grants.keys().all(|k| self.grants.contains_key(k))
    }

    /// Pair present and either unconditioned or every condition satisfied by `context`
    pub fn allows(
        &self,
        resource: Resource,
        action: Action,
        context: Option<&ConditionContext>,
    ) -> bool {
        self.get(resource, action)
            .map(|p| p.applies(context))
            .unwrap_or(false)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        for permission in iter {
            self.insert(permission);
        }
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.grants.len()))?;
        for permission in self.grants.values() {
            seq.serialize_element(permission)?;
        }
        seq.end()
    }
}

/// Check a resolved set for a permission under an optional request context
pub fn has_permission(
    resolved: &PermissionSet,
    resource: Resource,
    action: Action,
    context: Option<&ConditionContext>,
) -> bool {
    resolved.allows(resource, action, context)
}

/// Pure resolver over an immutable hierarchy. No locking; cheap to clone.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    hierarchy: Arc<RoleHierarchy>,
}

impl PermissionResolver {
    pub fn new(hierarchy: Arc<RoleHierarchy>) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// Every role reachable from `roles`, depth-first pre-order, each once
    pub fn expand_roles<I>(&self, roles: I) -> Vec<Role>
    where
        I: IntoIterator<Item = Role>,
    {
        let mut visited: HashSet<Role> = HashSet::default();
        let mut order = Vec::new();

        for root in roles {
            let mut stack = vec![root];
            while let Some(role) = stack.pop() {
                if !visited.insert(role) {
                    continue;
                }
                order.push(role);
                // Reverse so parents are walked in declared order
                stack.extend(self.hierarchy.inherited_roles(role).iter().rev().copied());
            }
        }
        order
    }

    pub fn resolve_permissions<I>(&self, roles: I) -> PermissionSet
    where
        I: IntoIterator<Item = Role>,
    {
        let mut set = PermissionSet::new();
        for role in self.expand_roles(roles) {
            set.extend(self.hierarchy.permissions_for_role(role).iter().cloned());
        }
        set
    }

    /// Resolve raw role names; unknown names contribute nothing
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> PermissionSet {
        let roles = names.iter().filter_map(|name| match name.as_ref().parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!(error = %e, "ignoring unknown role during resolution");
                None
            }
        });
        self.resolve_permissions(roles.collect::<Vec<_>>())
    }
}
