/*!
 * Access Limits and Defaults
 *
 * Centralized location for cache sizing, TTLs, timeouts and audit bounds.
 * Every value here is a default; `AccessConfig` can override the runtime ones.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Security-critical constants are marked with [SECURITY]
 */

use std::time::Duration;

// =============================================================================
// CACHE
// =============================================================================

/// User data TTL (5 minutes)
/// Roles change rarely; explicit invalidation covers assignment changes
pub const DEFAULT_USER_DATA_TTL: Duration = Duration::from_secs(5 * 60);

/// Route decision TTL (1 minute)
/// [SECURITY] Shorter than user data: encodes a path + role snapshot
pub const DEFAULT_ROUTE_ACCESS_TTL: Duration = Duration::from_secs(60);

/// Upper bound on user data TTL (24 hours)
/// [SECURITY] Keeps `Instant + ttl` representable and bounds stale access
pub const MAX_USER_DATA_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on route decision TTL (1 hour)
pub const MAX_ROUTE_ACCESS_TTL: Duration = Duration::from_secs(60 * 60);

/// Maximum cached users (1,000 entries)
pub const DEFAULT_MAX_USER_ENTRIES: usize = 1_000;

/// Maximum cached route decisions (5,000 entries)
pub const DEFAULT_MAX_ROUTE_ENTRIES: usize = 5_000;

/// Eviction batch divisor (1/4 = 25% of the store per pass)
/// [PERF] Amortizes eviction cost instead of evicting one entry per insert
pub const CACHE_EVICTION_DIVISOR: usize = 4;

/// Invalidation generation stripes (must be a power of two)
/// [SECURITY] A fetch that started before an invalidation of its stripe is never cached
pub const INVALIDATION_STRIPES: usize = 64;

/// Background sweep interval (60 seconds)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// UPSTREAM
// =============================================================================

/// Role fetch timeout (5 seconds)
/// [SECURITY] Expiry fails closed: the user is treated as holding no roles
pub const DEFAULT_ROLE_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// AUDIT
// =============================================================================

/// Maximum audit events stored globally (10,000 events)
/// [SECURITY] Prevents audit log from consuming excessive memory
pub const MAX_AUDIT_EVENTS: usize = 10_000;

/// Maximum audit events per user (100 events)
pub const MAX_AUDIT_EVENTS_PER_USER: usize = 100;

/// Maximum users with a per-user audit trail (10,000 users)
/// [SECURITY] User ids arrive from request headers; least recently seen are dropped
pub const MAX_AUDITED_USERS: usize = 10_000;

// =============================================================================
// INVITES
// =============================================================================

/// Team invitation code length
pub const INVITE_CODE_LENGTH: usize = 8;

/// Invitation code alphabet (no 0/O/1/I)
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
