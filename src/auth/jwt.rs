//! JWT token handling
//!
//! Two independent token classes share one codec: access tokens carry the
//! full identity claims, refresh tokens carry only the identity id and a type
//! marker. Each class has its own secret, so a token of one class never
//! verifies as the other.

use crate::auth::models::IdentityClaims;
use crate::error::{Error, Result};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Type discriminator stored in every refresh token
pub const REFRESH_TOKEN_TYPE: &str = "r";

/// Default access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_SECS: u64 = 15 * 60;

/// Default refresh token lifetime: 7 days
pub const DEFAULT_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;

/// Token verification and signing failures
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature or format")]
    InvalidSignature,

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

/// Access token payload: identity claims plus issued-at / expiry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Refresh token payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RefreshClaims {
    /// Identity id
    pub id: String,
    /// Type discriminator, always [`REFRESH_TOKEN_TYPE`]
    pub t: String,
    /// Unique token id, distinguishes tokens minted in the same second
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Secret and lifetime for one token class
#[derive(Clone)]
pub struct TokenPolicy {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: u64,
}

impl TokenPolicy {
    /// Fails with a configuration error if the secret is empty
    pub fn new(secret: &str, lifetime_secs: u64) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Configuration(
                "Signing secret is not set".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        })
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    fn expiry_from(&self, issued_at: i64) -> i64 {
        issued_at.saturating_add(i64::try_from(self.lifetime_secs).unwrap_or(i64::MAX))
    }

    fn sign<T: Serialize>(&self, claims: &T) -> std::result::Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> std::result::Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })
    }
}

/// A freshly signed token with its timing metadata
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    /// Present for refresh tokens only
    pub jti: Option<String>,
}

/// Issues and verifies access and refresh tokens
#[derive(Clone)]
pub struct TokenCodec {
    access: TokenPolicy,
    refresh: TokenPolicy,
}

impl TokenCodec {
    pub fn new(access: TokenPolicy, refresh: TokenPolicy) -> Self {
        Self { access, refresh }
    }

    /// Build both policies from raw secrets and lifetimes
    pub fn from_secrets(
        access_secret: &str,
        access_secs: u64,
        refresh_secret: &str,
        refresh_secs: u64,
    ) -> Result<Self> {
        Ok(Self::new(
            TokenPolicy::new(access_secret, access_secs)?,
            TokenPolicy::new(refresh_secret, refresh_secs)?,
        ))
    }

    pub fn access_lifetime_secs(&self) -> u64 {
        self.access.lifetime_secs()
    }

    pub fn refresh_lifetime_secs(&self) -> u64 {
        self.refresh.lifetime_secs()
    }

    /// Issue an access token for the given claims
    pub fn issue_access(&self, claims: &IdentityClaims) -> std::result::Result<IssuedToken, TokenError> {
        self.issue_access_at(claims, chrono::Utc::now().timestamp())
    }

    /// Issue an access token with an explicit issued-at timestamp
    pub fn issue_access_at(
        &self,
        claims: &IdentityClaims,
        issued_at: i64,
    ) -> std::result::Result<IssuedToken, TokenError> {
        let payload = AccessClaims {
            identity: claims.clone(),
            iat: issued_at,
            exp: self.access.expiry_from(issued_at),
        };
        Ok(IssuedToken {
            token: self.access.sign(&payload)?,
            issued_at,
            expires_at: payload.exp,
            jti: None,
        })
    }

    /// Issue a refresh token for an identity id
    pub fn issue_refresh(&self, identity_id: &str) -> std::result::Result<IssuedToken, TokenError> {
        self.issue_refresh_at(identity_id, chrono::Utc::now().timestamp())
    }

    /// Issue a refresh token with an explicit issued-at timestamp
    pub fn issue_refresh_at(
        &self,
        identity_id: &str,
        issued_at: i64,
    ) -> std::result::Result<IssuedToken, TokenError> {
        let payload = RefreshClaims {
            id: identity_id.to_string(),
            t: REFRESH_TOKEN_TYPE.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: issued_at,
            exp: self.refresh.expiry_from(issued_at),
        };
        Ok(IssuedToken {
            token: self.refresh.sign(&payload)?,
            issued_at,
            expires_at: payload.exp,
            jti: Some(payload.jti),
        })
    }

    /// Verify an access token and return its claims
    pub fn verify_access(&self, token: &str) -> std::result::Result<AccessClaims, TokenError> {
        self.access.verify(token)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> std::result::Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.refresh.verify(token)?;
        if claims.t != REFRESH_TOKEN_TYPE {
            return Err(TokenError::InvalidSignature);
        }
        Ok(claims)
    }
}
