//! Refresh cookie transport

use axum::http::{header, HeaderMap, HeaderValue};

use crate::auth::jwt::DEFAULT_REFRESH_SECS;

/// Default refresh cookie name
pub const DEFAULT_REFRESH_COOKIE_NAME: &str = "crms_rft";

/// Cookie attributes shared by set and clear. Clients only drop a cookie when
/// the clearing attributes match the ones it was set with.
const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=None; Path=/";

/// Name and lifetime of the refresh cookie
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    name: String,
    max_age_ms: u64,
}

impl CookiePolicy {
    /// `refresh_secs` is the refresh token lifetime; the cookie mirrors it
    pub fn new(name: impl Into<String>, refresh_secs: u64) -> Self {
        Self {
            name: name.into(),
            max_age_ms: refresh_secs.saturating_mul(1000),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie lifetime in milliseconds
    pub fn max_age_ms(&self) -> u64 {
        self.max_age_ms
    }

    /// Build the `Set-Cookie` value that stores `token`
    pub fn set_cookie_value(&self, token: &str) -> String {
        format!(
            "{}={}; {}; Max-Age={}",
            self.name,
            token,
            COOKIE_ATTRIBUTES,
            self.max_age_ms / 1000
        )
    }

    /// Build the `Set-Cookie` value that drops the cookie immediately
    pub fn clear_cookie_value(&self) -> String {
        format!(
            "{}=; {}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, COOKIE_ATTRIBUTES
        )
    }

    /// Append a `Set-Cookie` header carrying the refresh token
    pub fn set_refresh_cookie(&self, headers: &mut HeaderMap, token: &str) {
        append_set_cookie(headers, &self.set_cookie_value(token));
    }

    /// Append a `Set-Cookie` header that clears the refresh cookie
    pub fn clear_refresh_cookie(&self, headers: &mut HeaderMap) {
        append_set_cookie(headers, &self.clear_cookie_value());
    }

    /// Read the refresh token from the request's `Cookie` header
    pub fn read_refresh_cookie<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        get_cookie(headers, &self.name).filter(|value| !value.is_empty())
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_COOKIE_NAME, DEFAULT_REFRESH_SECS)
    }
}

fn append_set_cookie(headers: &mut HeaderMap, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Refusing to emit malformed Set-Cookie header: {}", e),
    }
}

/// Extract a cookie value from the Cookie header(s)
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}
