/*!
 * Request Identity
 * Authenticated user id attached to requests by the session layer
 */

use crate::core::types::UserId;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

/// Header carrying the authenticated user id. Stand-in for the external session layer.
pub const IDENTITY_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl Identity {
    pub fn user_id(&self) -> &str {
        &self.0
    }

    /// Extension set by `header_identity`, else the raw header
    pub fn from_parts(parts: &Parts) -> Option<Identity> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .or_else(|| from_header(&parts.headers))
    }
}

fn from_header(headers: &axum::http::HeaderMap) -> Option<Identity> {
    headers
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| Identity(value.to_string()))
}

/// Middleware copying the identity header into request extensions
pub async fn header_identity(mut request: Request, next: Next) -> Response {
    if let Some(identity) = from_header(request.headers()) {
        request.extensions_mut().insert(identity);
    }
    next.run(request).await
}

/// Extractor that never rejects; `None` means anonymous
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(Identity::user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(Identity::from_parts(parts)))
    }
}
