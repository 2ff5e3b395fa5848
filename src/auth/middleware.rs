//! Authentication middleware and extractors

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::auth::models::{IdentityClaims, Role};
use crate::error::{Error, Result};

const UNAUTHORIZED: &str = "Unauthorized";
const INVALID_OR_EXPIRED: &str = "Invalid or expired token";

/// Pull the bearer credential out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the request's bearer token and return the identity it carries
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<IdentityClaims> {
    let token =
        bearer_token(headers).ok_or_else(|| Error::Unauthenticated(UNAUTHORIZED.to_string()))?;

    codec
        .verify_access(token)
        .map(|claims| claims.identity)
        .map_err(|e| {
            tracing::debug!("Access token rejected: {}", e);
            Error::Unauthenticated(INVALID_OR_EXPIRED.to_string())
        })
}

/// Access guard: rejects requests without a valid access token and stores the
/// decoded [`IdentityClaims`] in the request extensions
pub async fn require_auth(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let claims = authenticate(&codec, req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Set of roles allowed through a route
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<HashSet<Role>>,
}

impl RoleGuard {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: Arc::new(roles.into_iter().collect()),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Check claims left behind by [`require_auth`]
    pub fn check(&self, claims: Option<&IdentityClaims>) -> Result<()> {
        let claims = claims.ok_or_else(|| Error::Unauthenticated(UNAUTHORIZED.to_string()))?;
        if !self.permits(claims.role) {
            tracing::info!(identity = %claims.id, role = %claims.role, "Role not permitted");
            return Err(Error::Authorization);
        }
        Ok(())
    }
}

/// Role guard. Must run after [`require_auth`].
pub async fn require_role(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    guard.check(req.extensions().get::<IdentityClaims>())?;
    Ok(next.run(req).await)
}

/// Extractor for the identity attached by [`require_auth`]
pub struct AuthUser(pub IdentityClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<IdentityClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| Error::Unauthenticated(UNAUTHORIZED.to_string()))
    }
}
