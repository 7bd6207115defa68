/*!
 * Verdicts
 * Outcome of an `authorize` call, shared by every enforcement surface
 */

use crate::permissions::types::{AccessType, DenialReason, UserContext};
use crate::roles::Role;
use serde::Serialize;

/// Access granted
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    /// Resolved user, absent for anonymous visits to public routes
    pub context: Option<UserContext>,
    pub access_type: AccessType,
    /// Decision came from the route cache
    pub cached: bool,
}

/// Access denied, with enough detail for any surface to act on it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Denial {
    pub reason: DenialReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<Role>>,
    /// Bare destination path; surfaces add their own query markers
    pub redirect_to: String,
    #[serde(skip)]
    pub context: Option<UserContext>,
}

impl Denial {
    pub fn is_authentication_failure(&self) -> bool {
        self.reason == DenialReason::LoginRequired
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Granted(Grant),
    Denied(Denial),
}

impl Verdict {
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted(_))
    }

    pub fn context(&self) -> Option<&UserContext> {
        match self {
            Verdict::Granted(grant) => grant.context.as_ref(),
            Verdict::Denied(denial) => denial.context.as_ref(),
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Granted(_) => None,
            Verdict::Denied(denial) => Some(denial),
        }
    }

    pub fn into_result(self) -> Result<Grant, Denial> {
        match self {
            Verdict::Granted(grant) => Ok(grant),
            Verdict::Denied(denial) => Err(denial),
        }
    }
}
