/*!
 * Access Tracing
 * Structured logging setup and per-decision spans using the tracing crate
 */

use crate::permissions::types::{DenialReason, Surface};
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Decisions slower than this are logged as warnings
const SLOW_DECISION_MS: u128 = 50;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PITCH_GUARD_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("PITCH_GUARD_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };

    match result {
        Ok(()) => info!(json = use_json, "Structured tracing initialized"),
        Err(e) => debug!(error = %e, "tracing subscriber already installed"),
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one enforcement decision
pub struct AccessSpan {
    span: Span,
    start: Instant,
    trace_id: String,
    surface: Surface,
}

impl AccessSpan {
    pub fn new(surface: Surface, path: &str, user_id: Option<&str>) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "access",
            trace_id = %trace_id,
            surface = surface.as_str(),
            path = path,
            user_id = user_id.unwrap_or("-"),
            outcome = tracing::field::Empty,
            reason = tracing::field::Empty,
            cached = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            trace_id,
            surface,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Underlying span, for `Instrument::instrument` on futures
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_granted(&self, cached: bool) {
        self.span.record("outcome", "granted");
        self.span.record("cached", cached);
    }

    pub fn record_denied(&self, reason: DenialReason) {
        self.span.record("outcome", "denied");
        self.span.record("reason", reason.as_str());
    }
}

impl Drop for AccessSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_DECISION_MS {
            warn!(
                trace_id = %self.trace_id,
                surface = self.surface.as_str(),
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow access decision"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                duration_us = duration.as_micros() as u64,
                "access decision completed"
            );
        }
    }
}
