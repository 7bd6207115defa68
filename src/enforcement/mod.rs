/*!
 * Enforcement Surfaces
 * Edge interceptor, layout guard, client wrapper and API guard over one access manager
 *
 * Each surface re-derives its own decision from its own identity; they share
 * only the manager's cache entries.
 */

pub mod api;
pub mod client;
pub mod edge;
pub mod identity;
pub mod server;
pub mod state;

pub use api::{ApiError, Authorized};
pub use client::{ClientGuard, ClientView, DeniedNotice, Navigator};
pub use edge::{edge_guard, should_skip};
pub use identity::{header_identity, Identity, MaybeIdentity, IDENTITY_HEADER};
pub use server::{LayoutGuard, PageOutcome};
pub use state::{redirect_target, AccessCheck, CheckState, INSUFFICIENT_PERMISSIONS};
