/*!
 * HTTP API
 * Axum application wiring the enforcement surfaces to JSON and page routes
 */

pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use router::router;
pub use state::AppState;
pub use types::{AppError, AppResult, ServerConfig};
