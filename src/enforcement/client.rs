/*!
 * Client Guard
 * Protective wrapper for client-rendered views
 *
 * Shows a loading view while the check is in flight, then children, the
 * caller's fallback, or a denial notice while navigating away. The notice
 * always names where the user is being sent and offers a way back, so a
 * failed navigation never leaves a blank screen.
 */

use super::state::{redirect_target, CheckState};
use crate::permissions::{AccessManager, Denial, Surface, UserContext, Verdict};
use crate::roles::Role;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Client-side navigation hooks
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: &str);
    fn go_back(&self);
}

/// Shown when access is denied and no fallback was supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeniedNotice {
    pub message: &'static str,
    pub redirect_to: String,
    pub can_go_back: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientView<T> {
    Loading,
    Children(T),
    Fallback(T),
    Denied(DeniedNotice),
}

#[derive(Debug, Clone)]
enum GuardState {
    Unchecked,
    Checking,
    Granted(Option<UserContext>),
    Denied { denial: Denial, target: String },
}

pub struct ClientGuard<N: Navigator> {
    manager: AccessManager,
    navigator: N,
    require_any: Vec<Role>,
    state: RwLock<GuardState>,
    navigated: AtomicBool,
}

impl<N: Navigator> ClientGuard<N> {
    pub fn new(manager: AccessManager, navigator: N) -> Self {
        Self {
            manager,
            navigator,
            require_any: Vec::new(),
            state: RwLock::new(GuardState::Unchecked),
            navigated: AtomicBool::new(false),
        }
    }

    pub fn require_any(mut self, roles: &[Role]) -> Self {
        self.require_any = roles.to_vec();
        self
    }

    pub fn state(&self) -> CheckState {
        match &*self.state.read() {
            GuardState::Unchecked => CheckState::Unchecked,
            GuardState::Checking => CheckState::Checking,
            GuardState::Granted(_) => CheckState::Granted,
            GuardState::Denied { .. } => CheckState::Denied,
        }
    }

    /// Resolve access. Views rendered meanwhile show the loading state.
    pub async fn check(&self, user_id: Option<&str>, path_and_query: &str) -> CheckState {
        *self.state.write() = GuardState::Checking;
        self.navigated.store(false, Ordering::Release);

        let path = path_and_query.split(['?', '#']).next().unwrap_or("/");
        let next = match self
            .manager
            .authorize_with_roles(Surface::Client, user_id, path, &self.require_any)
            .await
        {
            Verdict::Granted(grant) => GuardState::Granted(grant.context),
            Verdict::Denied(denial) => {
                let target = redirect_target(&denial, path_and_query);
                GuardState::Denied { denial, target }
            }
        };

        let state = match &next {
            GuardState::Granted(_) => CheckState::Granted,
            _ => CheckState::Denied,
        };
        *self.state.write() = next;
        state
    }

    /// Current view. Navigation on denial without fallback happens once per check.
    pub fn view<T, F>(&self, children: F, fallback: Option<T>) -> ClientView<T>
    where
        F: FnOnce(Option<&UserContext>) -> T,
    {
        let state = self.state.read().clone();
        match state {
            GuardState::Unchecked | GuardState::Checking => ClientView::Loading,
            GuardState::Granted(context) => ClientView::Children(children(context.as_ref())),
            GuardState::Denied { denial, target } => match fallback {
                Some(fallback) => ClientView::Fallback(fallback),
                None => {
                    if !self.navigated.swap(true, Ordering::AcqRel) {
                        self.navigator.navigate(&target);
                    }
                    ClientView::Denied(DeniedNotice {
                        message: denial.reason.public_message(),
                        redirect_to: target,
                        can_go_back: true,
                    })
                }
            },
        }
    }

    /// The notice's "go back" control
    pub fn go_back(&self) {
        self.navigator.go_back();
    }
}
