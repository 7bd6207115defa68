/*!
 * Application State
 * Shared handles passed to every HTTP handler
 */

use crate::permissions::AccessManager;
use crate::store::MemoryRoleStore;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub manager: AccessManager,
    pub store: Arc<MemoryRoleStore>,
}

impl AppState {
    pub fn new(manager: AccessManager, store: Arc<MemoryRoleStore>) -> Self {
        Self { manager, store }
    }
}
