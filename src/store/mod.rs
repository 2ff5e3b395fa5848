//! Identity store interface consumed by the session issuer

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::models::Identity;
use crate::error::Result;

pub use memory::MemoryStore;

/// Read access to identity records plus the last-login side effect.
///
/// Implementations are shared across requests behind an `Arc`, so they must
/// do their own synchronization.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by its login email
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Look up an identity by id
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>>;

    /// Record a successful login
    async fn record_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<()>;
}
