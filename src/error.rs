//! Error types for crms-auth

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::TokenError;

/// Message shared by every failed login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or inconsistent signing configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown identity, inactive identity or wrong password at login
    #[error("{}", INVALID_CREDENTIALS)]
    Authentication,

    /// Refresh cycle failed; the client must log in again
    #[error("{0}")]
    Session(String),

    /// Missing, invalid or expired access token on a protected route
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but the role is not permitted
    #[error("Forbidden")]
    Authorization,

    #[error("{0}")]
    BadRequest(String),

    #[error("Identity store error: {0}")]
    Store(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file not found. Run 'crms-auth init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication | Error::Session(_) | Error::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::Authorization => StatusCode::FORBIDDEN,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// `{ ok: false, error }` envelope used for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                ok: false,
                error: message,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
