/*!
 * Pitch Guard - Main Entry Point
 *
 * Development server for the access layer:
 * - Header-based identity (`x-user-id`)
 * - Page placeholders behind the edge interceptor
 * - JSON API guarded per handler
 */

use anyhow::Context;
use pitch_guard::api::ServerConfig;
use pitch_guard::{
    init_tracing, router, AccessConfig, AccessManager, AppState, MemoryRoleStore, RoleHierarchy,
    RoutePolicy,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing
    init_tracing();

    info!("Pitch Guard starting...");

    let config = AccessConfig::from_env().context("invalid access configuration")?;

    let hierarchy = match env_path("PITCH_GUARD_ROLES_FILE") {
        Some(path) => RoleHierarchy::load(&path)?,
        None => RoleHierarchy::football_defaults()?,
    };
    let policy = match env_path("PITCH_GUARD_ROUTES_FILE") {
        Some(path) => RoutePolicy::load(&path)?,
        None => RoutePolicy::football_defaults()?,
    };
    let store = Arc::new(match env_path("PITCH_GUARD_SEED_FILE") {
        Some(path) => MemoryRoleStore::load(&path)?,
        None => {
            warn!("No seed file configured, starting with an empty role store");
            MemoryRoleStore::new()
        }
    });

    let server_config = match std::env::var("PITCH_GUARD_ADDR") {
        Ok(addr) => ServerConfig::new(
            addr.parse::<SocketAddr>()
                .with_context(|| format!("invalid PITCH_GUARD_ADDR '{addr}'"))?,
        ),
        Err(_) => ServerConfig::default(),
    };

    let manager = AccessManager::new(store.clone(), hierarchy, policy, config);
    let cleanup = manager.spawn_cleanup();
    let app = router(AppState::new(manager, store));

    let listener = tokio::net::TcpListener::bind(server_config.address)
        .await
        .with_context(|| format!("failed to bind {}", server_config.address))?;
    info!(addr = %server_config.address, "Pitch Guard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cleanup.shutdown().await;
    info!("Pitch Guard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
