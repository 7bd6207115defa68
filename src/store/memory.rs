/*!
 * In-Memory Role Store
 * DashMap-backed role source and writer, plus team invitations
 */

use super::invites::{Invite, InviteCode};
use crate::core::errors::{ConfigError, FetchError, InviteError};
use crate::core::types::{TeamId, UserId};
use crate::permissions::types::{PermissionGrant, RoleAssignment, RoleSource, RoleWriter};
use crate::roles::Role;
use ahash::RandomState;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Seed document: `{ "users": { id: [assignment] }, "grants": [grant] }`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedDocument {
    pub users: HashMap<UserId, Vec<RoleAssignment>>,
    pub grants: Vec<PermissionGrant>,
}

pub struct MemoryRoleStore {
    assignments: DashMap<UserId, Vec<RoleAssignment>, RandomState>,
    grants: RwLock<Vec<PermissionGrant>>,
    invites: DashMap<InviteCode, Invite, RandomState>,
    offline: AtomicBool,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self {
            assignments: DashMap::with_hasher(RandomState::new()),
            grants: RwLock::new(Vec::new()),
            invites: DashMap::with_hasher(RandomState::new()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn from_seed(seed: SeedDocument) -> Self {
        let store = Self::new();
        for (user_id, assignments) in seed.users {
            store.set_assignments(user_id, assignments);
        }
        *store.grants.write() = seed.grants;
        store
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let seed: SeedDocument = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            what: "seed document",
            source,
        })?;
        Ok(Self::from_seed(seed))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            users = store.assignments.len(),
            "Seeded role store"
        );
        Ok(store)
    }

    /// Replace a user's assignments directly. Bypasses cache invalidation.
    pub fn set_assignments(&self, user_id: impl Into<UserId>, assignments: Vec<RoleAssignment>) {
        self.assignments.insert(user_id.into(), assignments);
    }

    pub fn add_grant(&self, grant: PermissionGrant) {
        self.grants.write().push(grant);
    }

    /// Simulate the backend going away; every fetch fails while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    pub fn user_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn create_invite(&self, team_id: impl Into<TeamId>, created_by: impl Into<UserId>) -> Invite {
        let team_id = team_id.into();
        let created_by = created_by.into();
        loop {
            let invite = Invite::new(team_id.clone(), created_by.clone());
            if let dashmap::mapref::entry::Entry::Vacant(slot) =
                self.invites.entry(invite.code.clone())
            {
                slot.insert(invite.clone());
                debug!(code = %invite.code, team_id = %invite.team_id, "Invite created");
                return invite;
            }
        }
    }

    pub fn validate_invite(&self, raw: &str) -> Result<Invite, InviteError> {
        let code = InviteCode::parse(raw)?;
        self.invites
            .get(&code)
            .map(|entry| entry.value().clone())
            .ok_or(InviteError::NotFound)
    }

    pub fn invites_for_team(&self, team_id: &str) -> Vec<Invite> {
        let mut invites: Vec<Invite> = self
            .invites
            .iter()
            .filter(|entry| entry.team_id == team_id)
            .map(|entry| entry.value().clone())
            .collect();
        invites.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        invites
    }

    fn ensure_online(&self) -> Result<(), FetchError> {
        if self.offline.load(Ordering::Acquire) {
            return Err(FetchError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

impl Default for MemoryRoleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleSource for MemoryRoleStore {
    async fn fetch_role_assignments(&self, user_id: &str) -> Result<Vec<RoleAssignment>, FetchError> {
        self.ensure_online()?;
        Ok(self
            .assignments
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn fetch_permission_grants(&self, roles: &[Role]) -> Result<Vec<PermissionGrant>, FetchError> {
        self.ensure_online()?;
        Ok(self
            .grants
            .read()
            .iter()
            .filter(|grant| roles.contains(&grant.role))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleWriter for MemoryRoleStore {
    async fn assign_role(&self, user_id: &str, assignment: RoleAssignment) -> Result<(), FetchError> {
        self.ensure_online()?;
        let mut entry = self.assignments.entry(user_id.to_string()).or_default();
        if !entry.contains(&assignment) {
            entry.push(assignment);
        }
        Ok(())
    }

    async fn revoke_role(&self, user_id: &str, role: Role) -> Result<bool, FetchError> {
        self.ensure_online()?;
        let Some(mut entry) = self.assignments.get_mut(user_id) else {
            return Ok(false);
        };
        let before = entry.len();
        entry.retain(|assignment| assignment.role != role.as_str());
        Ok(entry.len() != before)
    }
}
