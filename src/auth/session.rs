//! Session issuance: login, refresh rotation and logout

use axum::http::HeaderMap;
use chrono::Utc;
use std::sync::{Arc, LazyLock};

use crate::auth::cookie::CookiePolicy;
use crate::auth::jwt::TokenCodec;
use crate::auth::ledger::RefreshLedger;
use crate::auth::models::{Identity, IdentityClaims};
use crate::error::{Error, Result};
use crate::store::IdentityStore;

const REFRESH_MISSING: &str = "Refresh token missing";
const REFRESH_INVALID: &str = "Refresh token invalid";
const IDENTITY_INACTIVE: &str = "Identity inactive";

/// What a successful login or refresh hands back to the caller. The refresh
/// token is deliberately absent: it only ever travels in the cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: String,
    pub user: IdentityClaims,
}

/// Orchestrates credential checks and token issuance
#[derive(Clone)]
pub struct SessionIssuer {
    codec: Arc<TokenCodec>,
    cookies: CookiePolicy,
    store: Arc<dyn IdentityStore>,
    ledger: Option<RefreshLedger>,
}

impl SessionIssuer {
    pub fn new(codec: Arc<TokenCodec>, cookies: CookiePolicy, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            codec,
            cookies,
            store,
            ledger: None,
        }
    }

    /// Reject refresh tokens that have been superseded by a later rotation
    pub fn with_ledger(mut self, ledger: RefreshLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn cookies(&self) -> &CookiePolicy {
        &self.cookies
    }

    /// Verify email + password and issue a fresh token pair.
    ///
    /// Unknown email, inactive identity and wrong password all produce the
    /// same [`Error::Authentication`].
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        response: &mut HeaderMap,
    ) -> Result<IssuedSession> {
        let identity = match self.store.find_by_email(email).await? {
            Some(identity) if identity.is_active => identity,
            _ => {
                // Same bcrypt cost as a real mismatch
                verify_placeholder(password).await?;
                tracing::warn!("Login rejected: unknown or inactive identity");
                return Err(Error::Authentication);
            }
        };

        if !verify_password(password, &identity.password_hash).await? {
            tracing::warn!(identity = %identity.id, "Login rejected: password mismatch");
            return Err(Error::Authentication);
        }

        // Before issuing, so a store failure leaves the ledger untouched
        self.store.record_last_login(&identity.id, Utc::now()).await?;
        let session = self.issue_pair(&identity, None, response).await?;

        tracing::info!(identity = %identity.id, role = %identity.role, "Login succeeded");
        Ok(session)
    }

    /// Exchange the refresh cookie for a new access token and rotate the cookie
    pub async fn refresh(&self, request: &HeaderMap, response: &mut HeaderMap) -> Result<IssuedSession> {
        let token = self
            .cookies
            .read_refresh_cookie(request)
            .ok_or_else(|| Error::Session(REFRESH_MISSING.to_string()))?;

        let claims = self.codec.verify_refresh(token).map_err(|e| {
            tracing::debug!("Refresh token rejected: {}", e);
            Error::Session(REFRESH_INVALID.to_string())
        })?;

        if let Some(ledger) = &self.ledger {
            if !ledger.is_current(&claims.id, &claims.jti).await {
                tracing::warn!(identity = %claims.id, "Superseded refresh token presented");
                return Err(Error::Session(REFRESH_INVALID.to_string()));
            }
        }

        let identity = match self.store.find_by_id(&claims.id).await? {
            Some(identity) if identity.is_active => identity,
            _ => {
                tracing::info!(identity = %claims.id, "Refresh rejected: identity missing or inactive");
                return Err(Error::Session(IDENTITY_INACTIVE.to_string()));
            }
        };

        let session = self
            .issue_pair(&identity, Some(&claims.jti), response)
            .await?;

        tracing::info!(identity = %identity.id, "Session refreshed");
        Ok(session)
    }

    /// Clear the refresh cookie. Always succeeds.
    pub async fn logout(&self, request: &HeaderMap, response: &mut HeaderMap) {
        if let Some(ledger) = &self.ledger {
            if let Some(claims) = self
                .cookies
                .read_refresh_cookie(request)
                .and_then(|token| self.codec.verify_refresh(token).ok())
            {
                if ledger.is_current(&claims.id, &claims.jti).await {
                    ledger.forget(&claims.id).await;
                }
            }
        }

        self.cookies.clear_refresh_cookie(response);
        tracing::debug!("Refresh cookie cleared");
    }

    /// Issue access + refresh tokens and write the refresh cookie.
    /// `presented_jti` is the refresh token being rotated out, if any.
    async fn issue_pair(
        &self,
        identity: &Identity,
        presented_jti: Option<&str>,
        response: &mut HeaderMap,
    ) -> Result<IssuedSession> {
        let user = identity.claims();
        let access = self.codec.issue_access(&user)?;
        let refresh = self.codec.issue_refresh(&identity.id)?;

        if let (Some(ledger), Some(next)) = (&self.ledger, refresh.jti.as_deref()) {
            match presented_jti {
                Some(presented) => {
                    if !ledger.rotate(&identity.id, presented, next).await {
                        // Lost a race with a concurrent refresh of the same token
                        return Err(Error::Session(REFRESH_INVALID.to_string()));
                    }
                }
                None => ledger.record(&identity.id, next).await,
            }
        }

        self.cookies.set_refresh_cookie(response, &refresh.token);

        Ok(IssuedSession {
            access_token: access.token,
            user,
        })
    }
}

/// Hash compared against when no identity matches. Built on first use.
fn placeholder_hash() -> &'static str {
    static PLACEHOLDER: LazyLock<String> = LazyLock::new(|| {
        bcrypt::hash(uuid::Uuid::new_v4().to_string(), bcrypt::DEFAULT_COST).unwrap_or_default()
    });
    &PLACEHOLDER
}

/// Spend a full bcrypt verification on a login that matched no identity, so
/// unknown emails take as long as wrong passwords
async fn verify_placeholder(password: &str) -> Result<()> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let _ = bcrypt::verify(password, placeholder_hash());
    })
    .await
    .map_err(|e| Error::Other(format!("Password verification task failed: {}", e)))
}

/// bcrypt comparison off the async executor. A malformed stored hash counts
/// as a mismatch.
async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Other(format!("Password verification task failed: {}", e)))?;

    match outcome {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::error!("Stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}
