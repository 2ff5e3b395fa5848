//! crms-auth - access/refresh token lifecycle for the CRMS API
//!
//! Issues short-lived access tokens and cookie-borne refresh tokens, rotates
//! the refresh token on every refresh, and gates routes by bearer token and
//! role.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
