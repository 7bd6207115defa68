/*!
 * Layout Guard
 * Server-rendered page guard: decides before any content is produced
 */

use super::state::{redirect_target, AccessCheck};
use crate::permissions::{AccessManager, Surface, UserContext, Verdict};
use crate::roles::Role;
use axum::response::{IntoResponse, Redirect, Response};

/// Result of guarding a page render
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Render(T),
    Redirect(String),
}

impl<T> PageOutcome<T> {
    pub fn is_render(&self) -> bool {
        matches!(self, PageOutcome::Render(_))
    }
}

impl<T: IntoResponse> IntoResponse for PageOutcome<T> {
    fn into_response(self) -> Response {
        match self {
            PageOutcome::Render(body) => body.into_response(),
            PageOutcome::Redirect(target) => Redirect::temporary(&target).into_response(),
        }
    }
}

/// Guard for a layout, optionally restricted to a set of roles (e.g. the coach area)
#[derive(Clone)]
pub struct LayoutGuard {
    manager: AccessManager,
    require_any: Vec<Role>,
}

impl LayoutGuard {
    pub fn new(manager: AccessManager) -> Self {
        Self {
            manager,
            require_any: Vec::new(),
        }
    }

    pub fn require_any(mut self, roles: &[Role]) -> Self {
        self.require_any = roles.to_vec();
        self
    }

    /// Run `render` only once access is granted; a denial yields a redirect and nothing else
    pub async fn render<T, F>(
        &self,
        user_id: Option<&str>,
        path_and_query: &str,
        render: F,
    ) -> PageOutcome<T>
    where
        F: FnOnce(Option<&UserContext>) -> T,
    {
        let path = path_and_query.split(['?', '#']).next().unwrap_or("/");
        let mut check = AccessCheck::new(Surface::Server).require_any(&self.require_any);

        match check.run(&self.manager, user_id, path).await {
            Verdict::Granted(grant) => PageOutcome::Render(render(grant.context.as_ref())),
            Verdict::Denied(denial) => PageOutcome::Redirect(redirect_target(&denial, path_and_query)),
        }
    }
}
