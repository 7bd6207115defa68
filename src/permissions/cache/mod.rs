/*!
 * Access Cache
 * TTL + capacity bounded memo of per-user role data and per-route decisions
 *
 * Two independent stores share one shape: a concurrent map for lookups and a
 * short insert gate so evict+insert stays atomic with respect to other
 * inserts. Lookups never take the gate.
 *
 * User data inserts are fenced by a striped invalidation generation: a fetch
 * records its stripe's generation before reading the source, and its result
 * is dropped if the stripe was invalidated in the meantime.
 */

mod sweeper;

pub use sweeper::CleanupTask;

use crate::core::limits::{CACHE_EVICTION_DIVISOR, INVALIDATION_STRIPES};
use crate::core::types::UserId;
use crate::core::AccessConfig;
use crate::permissions::types::{AccessDecision, UserData};
use crate::roles::Role;
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Key of a cached route decision: `(user, pathname, sorted roles)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteAccessKey {
    user_id: UserId,
    pathname: String,
    roles: Vec<Role>,
}

impl RouteAccessKey {
    pub fn new(user_id: impl Into<UserId>, pathname: impl Into<String>, roles: &[Role]) -> Self {
        let mut roles = roles.to_vec();
        roles.sort_unstable();
        roles.dedup();
        Self {
            user_id: user_id.into(),
            pathname: pathname.into(),
            roles,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// One TTL store
struct TtlStore<K, V> {
    map: DashMap<K, Entry<V>, RandomState>,
    gate: Mutex<()>,
    max_entries: usize,
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            map: DashMap::with_capacity_and_hasher(max_entries, RandomState::new()),
            gate: Mutex::new(()),
            max_entries,
        }
    }

    /// Live value, if any. Expired entries stay until swept or evicted.
    fn get(&self, key: &K, now: Instant) -> Option<V> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite; returns how many entries were evicted to make room,
    /// or `None` when `ttl` overflows the clock
    fn set(&self, key: K, value: V, ttl: Duration, now: Instant) -> Option<usize> {
        self.set_if(key, value, ttl, now, || true)
    }

    /// `set`, admitted only if `admit` holds under the insert gate
    fn set_if<F>(&self, key: K, value: V, ttl: Duration, now: Instant, admit: F) -> Option<usize>
    where
        F: FnOnce() -> bool,
    {
        let entry = Entry {
            value,
            expires_at: now.checked_add(ttl)?,
        };

        let _gate = self.gate.lock();
        if !admit() {
            return None;
        }
        let mut evicted = 0;
        if !self.map.contains_key(&key) {
            while self.map.len() >= self.max_entries {
                let batch = self.evict_batch();
                if batch == 0 {
                    break;
                }
                evicted += batch;
            }
        }
        self.map.insert(key, entry);
        Some(evicted)
    }

    /// Drop the quarter of entries closest to expiry (at least one)
    fn evict_batch(&self) -> usize {
        let mut by_expiry: Vec<(K, Instant)> = self
            .map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().expires_at))
            .collect();
        let count = (by_expiry.len() / CACHE_EVICTION_DIVISOR).max(1);
        by_expiry.sort_unstable_by_key(|(_, expires_at)| *expires_at);

        by_expiry
            .into_iter()
            .take(count)
            .filter(|(key, _)| self.map.remove(key).is_some())
            .count()
    }

    fn remove_expired(&self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.map.len())
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Shared access cache. Constructed explicitly and injected; no globals.
///
/// # Performance
/// - Cache-line aligned so the hot hit/miss counters don't false-share with neighbours
#[repr(C, align(64))]
pub struct AccessCache {
    users: TtlStore<UserId, Arc<UserData>>,
    routes: TtlStore<RouteAccessKey, AccessDecision>,
    /// Invalidation generation per user stripe
    generations: Box<[AtomicU64]>,
    stripe_hasher: RandomState,
    user_ttl: Duration,
    route_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expired_removed: AtomicU64,
    invalidations: AtomicU64,
}

impl AccessCache {
    pub fn new(config: &AccessConfig) -> Self {
        Self::with_limits(
            config.max_user_entries,
            config.max_route_entries,
            config.user_ttl,
            config.route_ttl,
        )
    }

    pub fn with_limits(
        max_user_entries: usize,
        max_route_entries: usize,
        user_ttl: Duration,
        route_ttl: Duration,
    ) -> Self {
        Self {
            users: TtlStore::new(max_user_entries),
            routes: TtlStore::new(max_route_entries),
            generations: (0..INVALIDATION_STRIPES).map(|_| AtomicU64::new(0)).collect(),
            stripe_hasher: RandomState::new(),
            user_ttl,
            route_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expired_removed: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn user_ttl(&self) -> Duration {
        self.user_ttl
    }

    pub fn route_ttl(&self) -> Duration {
        self.route_ttl
    }

    pub fn get_user_data(&self, user_id: &str) -> Option<Arc<UserData>> {
        let found = self.users.get(&user_id.to_string(), Instant::now());
        self.record_lookup(found.is_some());
        found
    }

    pub fn set_user_data(&self, user_id: impl Into<UserId>, data: Arc<UserData>, ttl: Duration) {
        let evicted = self.users.set(user_id.into(), data, ttl, Instant::now());
        self.record_insert(evicted, "user");
    }

    /// Generation to pass to `set_user_data_if_current`. Read it before fetching.
    pub fn user_generation(&self, user_id: &str) -> u64 {
        self.stripe(user_id).load(Ordering::Acquire)
    }

    /// Cache a fetch result unless the user was invalidated since `generation`
    /// was read. Returns whether the entry was stored.
    pub fn set_user_data_if_current(
        &self,
        user_id: impl Into<UserId>,
        data: Arc<UserData>,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let user_id = user_id.into();
        let stripe = self.stripe(&user_id);
        let current = || stripe.load(Ordering::Acquire) == generation;
        match self.users.set_if(user_id.clone(), data, ttl, Instant::now(), current) {
            Some(evicted) => {
                self.record_evictions(evicted, "user");
                true
            }
            None => {
                debug!(user_id = %user_id, "user invalidated during fetch, result not cached");
                false
            }
        }
    }

    pub fn get_route_access(&self, key: &RouteAccessKey) -> Option<AccessDecision> {
        let found = self.routes.get(key, Instant::now());
        self.record_lookup(found.is_some());
        found
    }

    pub fn set_route_access(&self, key: RouteAccessKey, decision: AccessDecision, ttl: Duration) {
        let evicted = self.routes.set(key, decision, ttl, Instant::now());
        self.record_insert(evicted, "route");
    }

    /// Remove the user's data and every route decision cached for them.
    ///
    /// Fetches already in flight for the user will not be cached.
    pub fn invalidate_user(&self, user_id: &str) {
        {
            let _gate = self.users.gate.lock();
            self.stripe(user_id).fetch_add(1, Ordering::AcqRel);
            self.users.map.remove(user_id);
        }
        self.routes.map.retain(|key, _| key.user_id != user_id);
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(user_id, "access cache invalidated for user");
    }

    /// Sweep expired entries from both stores
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let removed = self.users.remove_expired(now) + self.routes.remove_expired(now);
        if removed > 0 {
            self.expired_removed
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, "expired access cache entries swept");
        }
        removed
    }

    pub fn clear(&self) {
        self.users.map.clear();
        self.routes.map.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            user_entries: self.users.len(),
            route_entries: self.routes.len(),
            max_user_entries: self.users.max_entries,
            max_route_entries: self.routes.max_entries,
            hits,
            misses,
            total_requests: total,
            evictions: self.evictions.load(Ordering::Relaxed),
            expired_removed: self.expired_removed.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            hit_rate,
        }
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn stripe(&self, user_id: &str) -> &AtomicU64 {
        let index = self.stripe_hasher.hash_one(user_id) as usize & (INVALIDATION_STRIPES - 1);
        &self.generations[index]
    }

    fn record_insert(&self, evicted: Option<usize>, store: &'static str) {
        match evicted {
            Some(evicted) => self.record_evictions(evicted, store),
            None => warn!(store, "ttl overflows the clock, entry not cached"),
        }
    }

    fn record_evictions(&self, evicted: usize, store: &'static str) {
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            debug!(store, evicted, "access cache at capacity, evicted entries");
        }
    }
}

impl Default for AccessCache {
    fn default() -> Self {
        Self::new(&AccessConfig::default())
    }
}

/// Cache statistics. Observability only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub user_entries: usize,
    pub route_entries: usize,
    pub max_user_entries: usize,
    pub max_route_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub evictions: u64,
    pub expired_removed: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}
