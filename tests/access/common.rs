/*!
 * Shared fixtures: seeded stores and an instrumented role source
 */

#![allow(dead_code)]

use async_trait::async_trait;
use pitch_guard::permissions::PermissionGrant;
use pitch_guard::{
    AccessConfig, AccessManager, FetchError, MemoryRoleStore, Role, RoleAssignment,
    RoleHierarchy, RoleSource, RoutePolicy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn store(users: &[(&str, &[Role])]) -> Arc<MemoryRoleStore> {
    let store = MemoryRoleStore::new();
    for (user_id, roles) in users {
        store.set_assignments(
            *user_id,
            roles.iter().map(|role| RoleAssignment::new(*role)).collect(),
        );
    }
    Arc::new(store)
}

pub fn manager(source: Arc<dyn RoleSource>) -> AccessManager {
    manager_with_config(source, AccessConfig::default())
}

pub fn manager_with_config(source: Arc<dyn RoleSource>, config: AccessConfig) -> AccessManager {
    AccessManager::new(
        source,
        RoleHierarchy::football_defaults().unwrap(),
        RoutePolicy::football_defaults().unwrap(),
        config,
    )
}

/// Wraps a store, counting fetches and optionally delaying each one
pub struct InstrumentedSource {
    pub store: Arc<MemoryRoleStore>,
    pub delay: Duration,
    /// Delay applied after the store was read, so the result goes stale in flight
    pub delay_after_read: Duration,
    fetches: AtomicUsize,
}

impl InstrumentedSource {
    pub fn new(store: Arc<MemoryRoleStore>) -> Self {
        Self {
            store,
            delay: Duration::ZERO,
            delay_after_read: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_after_read(mut self, delay: Duration) -> Self {
        self.delay_after_read = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleSource for InstrumentedSource {
    async fn fetch_role_assignments(&self, user_id: &str) -> Result<Vec<RoleAssignment>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let assignments = self.store.fetch_role_assignments(user_id).await;
        if !self.delay_after_read.is_zero() {
            tokio::time::sleep(self.delay_after_read).await;
        }
        assignments
    }

    async fn fetch_permission_grants(&self, roles: &[Role]) -> Result<Vec<PermissionGrant>, FetchError> {
        self.store.fetch_permission_grants(roles).await
    }
}
