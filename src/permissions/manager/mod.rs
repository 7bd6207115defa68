/*!
 * Manager Module
 * Access manager and the verdicts it hands to enforcement surfaces
 */

mod manager;
mod verdict;

pub use manager::AccessManager;
pub use verdict::{Denial, Grant, Verdict};
