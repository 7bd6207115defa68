/*!
 * Monitoring
 * Tracing setup and access decision spans
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, AccessSpan};
