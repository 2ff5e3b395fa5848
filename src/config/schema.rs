//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::auth::cookie::{CookiePolicy, DEFAULT_REFRESH_COOKIE_NAME};
use crate::auth::duration::parse_duration;
use crate::auth::jwt::{TokenCodec, DEFAULT_ACCESS_SECS, DEFAULT_REFRESH_SECS};
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Fail fast on configuration that would make every request fail
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()
    }
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name, reported by `/` and `/health`
    #[serde(default = "default_env")]
    pub env: String,

    /// CORS origin allowed to send credentialed requests. `*` allows any
    /// origin, without credentials.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_env() -> String {
    "development".to_string()
}

fn default_allowed_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            env: default_env(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Token signing and refresh cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token signing secret (required)
    #[serde(default)]
    pub access_secret: Option<String>,

    /// Refresh token signing secret (required, must differ from the access secret)
    #[serde(default)]
    pub refresh_secret: Option<String>,

    #[serde(default = "default_access_expires_in")]
    pub access_expires_in: String,

    #[serde(default = "default_refresh_expires_in")]
    pub refresh_expires_in: String,

    #[serde(default = "default_refresh_cookie_name")]
    pub refresh_cookie_name: String,

    /// Reject refresh tokens superseded by a later rotation
    #[serde(default)]
    pub reject_superseded_refresh: bool,
}

fn default_access_expires_in() -> String {
    "15m".to_string()
}

fn default_refresh_expires_in() -> String {
    "7d".to_string()
}

fn default_refresh_cookie_name() -> String {
    DEFAULT_REFRESH_COOKIE_NAME.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            refresh_secret: None,
            access_expires_in: default_access_expires_in(),
            refresh_expires_in: default_refresh_expires_in(),
            refresh_cookie_name: default_refresh_cookie_name(),
            reject_superseded_refresh: false,
        }
    }
}

impl AuthConfig {
    pub fn access_secs(&self) -> u64 {
        parse_duration(Some(&self.access_expires_in), DEFAULT_ACCESS_SECS)
    }

    pub fn refresh_secs(&self) -> u64 {
        parse_duration(Some(&self.refresh_expires_in), DEFAULT_REFRESH_SECS)
    }

    fn secret<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
        match value.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(Error::Configuration(format!("{} is not set", key))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let access = Self::secret(&self.access_secret, "JWT_SECRET")?;
        let refresh = Self::secret(&self.refresh_secret, "JWT_REFRESH_SECRET")?;
        if access == refresh {
            return Err(Error::Configuration(
                "JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string(),
            ));
        }
        if self.refresh_cookie_name.is_empty()
            || self
                .refresh_cookie_name
                .contains(|c: char| c.is_whitespace() || "=;,".contains(c))
        {
            return Err(Error::Configuration(format!(
                "Invalid refresh cookie name: {:?}",
                self.refresh_cookie_name
            )));
        }
        Ok(())
    }

    /// Build the token codec, validating secrets first
    pub fn token_codec(&self) -> Result<TokenCodec> {
        self.validate()?;
        TokenCodec::from_secrets(
            Self::secret(&self.access_secret, "JWT_SECRET")?,
            self.access_secs(),
            Self::secret(&self.refresh_secret, "JWT_REFRESH_SECRET")?,
            self.refresh_secs(),
        )
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::new(self.refresh_cookie_name.clone(), self.refresh_secs())
    }
}
