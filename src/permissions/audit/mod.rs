/*!
 * Access Audit Trail
 * Records access decisions and denial categories for security monitoring
 */

use crate::core::limits::{
    CACHE_EVICTION_DIVISOR, MAX_AUDITED_USERS, MAX_AUDIT_EVENTS, MAX_AUDIT_EVENTS_PER_USER,
};
use crate::core::types::UserId;
use crate::permissions::types::{AccessType, DenialReason, Surface};
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// One enforcement decision
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditEvent {
    pub surface: Surface,
    pub path: String,
    pub user_id: Option<UserId>,
    pub access_type: Option<AccessType>,
    /// `None` when access was granted
    pub denial: Option<DenialReason>,
    pub severity: AuditSeverity,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub logged_at: SystemTime,
}

impl AuditEvent {
    pub fn granted(
        surface: Surface,
        path: impl Into<String>,
        user_id: Option<&str>,
        access_type: Option<AccessType>,
    ) -> Self {
        Self {
            surface,
            path: path.into(),
            user_id: user_id.map(str::to_string),
            access_type,
            denial: None,
            severity: AuditSeverity::Info,
            logged_at: SystemTime::now(),
        }
    }

    pub fn denied(
        surface: Surface,
        path: impl Into<String>,
        user_id: Option<&str>,
        access_type: Option<AccessType>,
        reason: DenialReason,
    ) -> Self {
        let severity = match reason {
            DenialReason::LoginRequired | DenialReason::ProfileSetupRequired => {
                AuditSeverity::Info
            }
            DenialReason::InsufficientRole => AuditSeverity::Warning,
            // Upstream outages deny everyone; worth paging on
            DenialReason::UpstreamUnavailable => AuditSeverity::Critical,
        };

        Self {
            surface,
            path: path.into(),
            user_id: user_id.map(str::to_string),
            access_type,
            denial: Some(reason),
            severity,
            logged_at: SystemTime::now(),
        }
    }

    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_denied(&self) -> bool {
        self.denial.is_some()
    }
}

/// Per-user slice of the audit trail
struct UserTrail {
    events: VecDeque<AuditEvent>,
    denials: u64,
    /// Logical time of the most recent event
    last_seen: u64,
}

impl UserTrail {
    fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            denials: 0,
            last_seen: 0,
        }
    }

    fn push(&mut self, event: AuditEvent, capacity: usize, seen: u64) {
        if event.is_denied() {
            self.denials += 1;
        }
        if self.events.len() >= capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.last_seen = seen;
    }
}

/// Audit logger for access decisions
pub struct AuditLogger {
    /// Global event log (ring buffer)
    events: RwLock<VecDeque<AuditEvent>>,
    /// Per-user event logs and denial counts, bounded to `max_users`
    user_trails: DashMap<UserId, UserTrail, RandomState>,
    /// Serializes admission of new users so the bound holds
    admit_gate: Mutex<()>,
    clock: AtomicU64,
    /// Denials per category, anonymous requests included
    reason_counts: DashMap<DenialReason, u64, RandomState>,
    capacity: usize,
    per_user_capacity: usize,
    max_users: usize,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self::with_capacity(MAX_AUDIT_EVENTS, MAX_AUDIT_EVENTS_PER_USER)
    }

    pub fn with_capacity(capacity: usize, per_user_capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity)),
            user_trails: DashMap::with_hasher(RandomState::new()),
            admit_gate: Mutex::new(()),
            clock: AtomicU64::new(0),
            reason_counts: DashMap::with_hasher(RandomState::new()),
            capacity,
            per_user_capacity: per_user_capacity.max(1),
            max_users: MAX_AUDITED_USERS,
        }
    }

    /// Cap on users with a per-user trail; least recently seen are dropped first
    pub fn with_user_limit(mut self, max_users: usize) -> Self {
        self.max_users = max_users.max(1);
        self
    }

    pub fn log(&self, event: AuditEvent) {
        if let Some(reason) = event.denial {
            match event.severity {
                AuditSeverity::Critical | AuditSeverity::Warning => warn!(
                    surface = event.surface.as_str(),
                    path = %event.path,
                    user_id = event.user_id.as_deref().unwrap_or("-"),
                    reason = reason.as_str(),
                    "access denied"
                ),
                AuditSeverity::Info => info!(
                    surface = event.surface.as_str(),
                    path = %event.path,
                    user_id = event.user_id.as_deref().unwrap_or("-"),
                    reason = reason.as_str(),
                    "access denied"
                ),
            }

            *self.reason_counts.entry(reason).or_insert(0) += 1;
        }

        if let Some(user_id) = &event.user_id {
            self.record_for_user(user_id, event.clone());
        }

        let mut events = self.events.write();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    fn record_for_user(&self, user_id: &str, event: AuditEvent) {
        let seen = self.clock.fetch_add(1, Ordering::Relaxed);
        if let Some(mut trail) = self.user_trails.get_mut(user_id) {
            trail.push(event, self.per_user_capacity, seen);
            return;
        }

        let _gate = self.admit_gate.lock();
        if !self.user_trails.contains_key(user_id) && self.user_trails.len() >= self.max_users {
            self.evict_least_recent();
        }
        self.user_trails
            .entry(user_id.to_string())
            .or_insert_with(|| UserTrail::new(self.per_user_capacity))
            .push(event, self.per_user_capacity, seen);
    }

    /// Drop the least recently seen quarter of user trails (at least one)
    fn evict_least_recent(&self) {
        let mut by_age: Vec<(UserId, u64)> = self
            .user_trails
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().last_seen))
            .collect();
        let count = (by_age.len() / CACHE_EVICTION_DIVISOR).max(1);
        by_age.sort_unstable_by_key(|(_, last_seen)| *last_seen);

        for (user_id, _) in by_age.into_iter().take(count) {
            self.user_trails.remove(&user_id);
        }
        debug!(evicted = count, "audit user limit reached, dropped least recent trails");
    }

    /// Most recent first
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    pub fn for_user(&self, user_id: &str, limit: usize) -> Vec<AuditEvent> {
        self.user_trails
            .get(user_id)
            .map(|trail| trail.events.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn denial_count(&self, user_id: &str) -> u64 {
        self.user_trails
            .get(user_id)
            .map(|trail| trail.denials)
            .unwrap_or(0)
    }

    pub fn denials_by_reason(&self, reason: DenialReason) -> u64 {
        self.reason_counts.get(&reason).map(|e| *e).unwrap_or(0)
    }

    pub fn users_with_denials(&self) -> Vec<(UserId, u64)> {
        self.user_trails
            .iter()
            .filter(|entry| entry.value().denials > 0)
            .map(|entry| (entry.key().clone(), entry.value().denials))
            .collect()
    }

    pub fn clear_user(&self, user_id: &str) {
        self.user_trails.remove(user_id);
    }

    pub fn clear_all(&self) {
        self.events.write().clear();
        self.user_trails.clear();
        self.reason_counts.clear();
    }

    pub fn stats(&self) -> AuditStats {
        let total_events = self.events.read().len();
        let denials_by_reason: BTreeMap<DenialReason, u64> = self
            .reason_counts
            .iter()
            .map(|e| (*e.key(), *e.value()))
            .collect();

        AuditStats {
            total_events,
            total_denials: denials_by_reason.values().sum(),
            users_tracked: self.user_trails.len(),
            denials_by_reason,
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: usize,
    pub total_denials: u64,
    pub users_tracked: usize,
    pub denials_by_reason: BTreeMap<DenialReason, u64>,
}
