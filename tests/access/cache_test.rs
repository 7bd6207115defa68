/*!
 * Access cache: round-trips, invalidation, capacity and expiry
 */

use pitch_guard::permissions::{
    AccessCache, AccessDecision, AccessType, CleanupTask, RouteAccessKey, UserData,
};
use pitch_guard::Role;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(300);

fn data(roles: &[Role]) -> Arc<UserData> {
    Arc::new(UserData {
        roles: roles.to_vec(),
        ..UserData::default()
    })
}

fn granted() -> AccessDecision {
    AccessDecision {
        has_access: true,
        access_type: AccessType::MultiRole,
        required_roles: None,
        suggested_redirect: None,
    }
}

#[test]
fn test_round_trip_then_invalidate() {
    let cache = AccessCache::default();
    let value = data(&[Role::Coach]);

    cache.set_user_data("u1", Arc::clone(&value), TTL);
    assert_eq!(cache.get_user_data("u1"), Some(value));

    cache.invalidate_user("u1");
    assert_eq!(cache.get_user_data("u1"), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.invalidations, 1);
}

#[test]
fn test_invalidation_does_not_touch_similar_ids() {
    let cache = AccessCache::default();
    for user in ["u1", "u10", "u1:x"] {
        cache.set_user_data(user, data(&[Role::Fan]), TTL);
        cache.set_route_access(RouteAccessKey::new(user, "/fan/dashboard", &[Role::Fan]), granted(), TTL);
    }

    cache.invalidate_user("u1");

    assert_eq!(cache.get_user_data("u1"), None);
    assert!(cache.get_user_data("u10").is_some());
    assert!(cache.get_user_data("u1:x").is_some());
    assert_eq!(
        cache.get_route_access(&RouteAccessKey::new("u1", "/fan/dashboard", &[Role::Fan])),
        None
    );
    assert_eq!(
        cache.get_route_access(&RouteAccessKey::new("u10", "/fan/dashboard", &[Role::Fan])),
        Some(granted())
    );
    assert_eq!(cache.stats().route_entries, 2);
}

#[test]
fn test_route_key_ignores_role_order() {
    let cache = AccessCache::default();
    cache.set_route_access(
        RouteAccessKey::new("u1", "/team/T1", &[Role::Parent, Role::Coach]),
        granted(),
        TTL,
    );
    assert_eq!(
        cache.get_route_access(&RouteAccessKey::new("u1", "/team/T1", &[Role::Coach, Role::Parent])),
        Some(granted())
    );
}

#[test]
fn test_concurrent_inserts_never_exceed_capacity() {
    let cache = Arc::new(AccessCache::with_limits(16, 16, TTL, TTL));

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..200 {
                    let user = format!("w{worker}-u{i}");
                    cache.set_user_data(user.as_str(), data(&[Role::Fan]), TTL);
                    cache.set_route_access(RouteAccessKey::new(user, "/", &[]), granted(), TTL);
                    let stats = cache.stats();
                    assert!(stats.user_entries <= 16, "user store grew to {}", stats.user_entries);
                    assert!(stats.route_entries <= 16, "route store grew to {}", stats.route_entries);
                }
            });
        }
    });

    let stats = cache.stats();
    assert!(stats.user_entries <= 16);
    assert!(stats.evictions > 0);
}

#[test]
fn test_eviction_prefers_entries_closest_to_expiry() {
    let cache = AccessCache::with_limits(4, 4, TTL, TTL);
    cache.set_user_data("short", data(&[]), Duration::from_secs(10));
    for user in ["a", "b", "c"] {
        cache.set_user_data(user, data(&[]), TTL);
    }

    cache.set_user_data("d", data(&[]), TTL);

    assert_eq!(cache.get_user_data("short"), None);
    for user in ["a", "b", "c", "d"] {
        assert!(cache.get_user_data(user).is_some(), "{user} was evicted");
    }
}

#[tokio::test(start_paused = true)]
async fn test_expired_entries_miss_and_get_swept() {
    let cache = Arc::new(AccessCache::default());
    cache.set_user_data("u1", data(&[Role::Fan]), Duration::from_secs(1));
    cache.set_route_access(RouteAccessKey::new("u1", "/", &[Role::Fan]), granted(), Duration::from_secs(1));
    let cleanup = CleanupTask::spawn(&cache, Duration::from_secs(3600));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get_user_data("u1"), None);
    // A miss does not delete eagerly
    assert_eq!(cache.stats().user_entries, 1);

    cleanup.trigger();
    for _ in 0..10 {
        if cache.stats().user_entries == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }

    let stats = cache.stats();
    assert_eq!(stats.user_entries, 0);
    assert_eq!(stats.route_entries, 0);
    assert_eq!(stats.expired_removed, 2);
    cleanup.shutdown().await;
}
