/*!
 * Core Types
 * Identifier aliases shared across the access layer
 */

/// Authenticated user identifier as issued by the session layer
pub type UserId = String;

/// Team identifier scoping a role assignment
pub type TeamId = String;

/// Club identifier scoping a role assignment
pub type ClubId = String;
