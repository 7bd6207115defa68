/*!
 * Check State Machine
 * Unchecked -> Checking -> {Granted, Denied}, shared by every surface
 */

use crate::permissions::{AccessManager, Denial, DenialReason, Surface, Verdict};
use crate::roles::Role;
use serde::Serialize;

/// Marker appended to dashboard redirects for under-privileged users
pub const INSUFFICIENT_PERMISSIONS: &str = "insufficient_permissions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    /// Role resolution in flight
    Checking,
    Granted,
    Denied,
}

impl CheckState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckState::Granted | CheckState::Denied)
    }
}

/// One access check on one surface
#[derive(Debug)]
pub struct AccessCheck {
    surface: Surface,
    require_any: Vec<Role>,
    state: CheckState,
}

impl AccessCheck {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            require_any: Vec::new(),
            state: CheckState::Unchecked,
        }
    }

    /// Additionally require one of `roles`
    pub fn require_any(mut self, roles: &[Role]) -> Self {
        self.require_any = roles.to_vec();
        self
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub async fn run(&mut self, manager: &AccessManager, user_id: Option<&str>, path: &str) -> Verdict {
        self.state = CheckState::Checking;
        let verdict = manager
            .authorize_with_roles(self.surface, user_id, path, &self.require_any)
            .await;
        self.state = if verdict.is_granted() {
            CheckState::Granted
        } else {
            CheckState::Denied
        };
        verdict
    }
}

/// Full redirect URL for a denial.
///
/// Login redirects carry `returnUrl` with the original path and query;
/// under-privileged users get their dashboard with an error marker;
/// users without roles go to profile setup unmarked.
pub fn redirect_target(denial: &Denial, path_and_query: &str) -> String {
    match denial.reason {
        DenialReason::LoginRequired => format!(
            "{}?returnUrl={}",
            denial.redirect_to,
            urlencoding::encode(path_and_query)
        ),
        DenialReason::InsufficientRole | DenialReason::UpstreamUnavailable => {
            let separator = if denial.redirect_to.contains('?') { '&' } else { '?' };
            format!(
                "{}{}error={}",
                denial.redirect_to, separator, INSUFFICIENT_PERMISSIONS
            )
        }
        DenialReason::ProfileSetupRequired => denial.redirect_to.clone(),
    }
}
