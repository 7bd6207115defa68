/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use crate::roles::Role;
use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

/// Result type for fallible startup/configuration work
pub type GuardResult<T> = Result<T, GuardError>;

/// Configuration errors. Always fatal at startup, never raised at request time.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Role '{0}' inherits from itself")]
    #[diagnostic(
        code(config::self_inheritance),
        help("Remove the role from its own `inherits` list.")
    )]
    SelfInheritance(Role),

    #[error("Cyclic role inheritance: {}", format_cycle(.0))]
    #[diagnostic(
        code(config::cyclic_inheritance),
        help("Role inheritance must form a DAG. Break one of the listed edges.")
    )]
    CyclicInheritance(Vec<Role>),

    #[error("Role '{0}' is defined more than once")]
    #[diagnostic(code(config::duplicate_role))]
    DuplicateRole(Role),

    #[error("Role '{role}' inherits from undefined role '{parent}'")]
    #[diagnostic(
        code(config::undefined_parent),
        help("Every inherited role needs its own definition, even if it grants nothing.")
    )]
    UndefinedParent { role: Role, parent: Role },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(config::invalid_pattern),
        help("Patterns are absolute paths; dynamic segments look like `[teamId]`.")
    )]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: String, reason: String },

    #[error("Failed to parse {what}: {source}")]
    #[diagnostic(code(config::parse))]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn format_cycle(cycle: &[Role]) -> String {
    cycle
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors from the external role store
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum FetchError {
    #[error("Role source unavailable: {0}")]
    #[diagnostic(
        code(fetch::unavailable),
        help("The persistence backend rejected or failed the lookup. The user is denied until it recovers.")
    )]
    Unavailable(String),

    #[error("Role fetch timed out after {0:?}")]
    #[diagnostic(code(fetch::timeout))]
    Timeout(Duration),

    #[error("Role fetch task failed: {0}")]
    #[diagnostic(code(fetch::task_failed))]
    Task(String),
}

/// Invitation code errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum InviteError {
    #[error("Invite code must be {expected} characters, got {actual}")]
    #[diagnostic(code(invite::invalid_length))]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invite code contains invalid character '{0}'")]
    #[diagnostic(
        code(invite::invalid_character),
        help("Codes use A-Z and 2-9, without 0, O, 1 or I.")
    )]
    InvalidCharacter(char),

    #[error("Invite code not found")]
    #[diagnostic(code(invite::not_found))]
    NotFound,
}

/// Unified error type
#[derive(Error, Debug, Diagnostic)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invite error: {0}")]
    #[diagnostic(transparent)]
    Invite(#[from] InviteError),
}
