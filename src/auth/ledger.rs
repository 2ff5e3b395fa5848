//! Superseded refresh token detection
//!
//! Rotation alone only replaces the cookie; the previous refresh token still
//! carries a valid signature until it expires. When the ledger is enabled the
//! issuer remembers the latest refresh `jti` per identity and rejects any
//! other. State is per process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Latest refresh token id per identity
#[derive(Clone, Default)]
pub struct RefreshLedger {
    current: Arc<RwLock<HashMap<String, String>>>,
}

impl RefreshLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `jti` the only acceptable refresh token for `identity_id`
    pub async fn record(&self, identity_id: &str, jti: &str) {
        self.current
            .write()
            .await
            .insert(identity_id.to_string(), jti.to_string());
    }

    /// Whether `jti` is the latest refresh token issued to `identity_id`
    pub async fn is_current(&self, identity_id: &str, jti: &str) -> bool {
        self.current
            .read()
            .await
            .get(identity_id)
            .is_some_and(|current| current == jti)
    }

    /// Atomically check `presented` and replace it with `next`.
    /// Returns false, leaving the ledger untouched, if `presented` was stale.
    pub async fn rotate(&self, identity_id: &str, presented: &str, next: &str) -> bool {
        let mut current = self.current.write().await;
        match current.get_mut(identity_id) {
            Some(jti) if jti == presented => {
                *jti = next.to_string();
                true
            }
            _ => false,
        }
    }

    pub async fn forget(&self, identity_id: &str) {
        self.current.write().await.remove(identity_id);
    }

    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.current.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_check() {
        let ledger = RefreshLedger::new();
        ledger.record("u1", "j1").await;

        assert!(ledger.is_current("u1", "j1").await);
        assert!(!ledger.is_current("u1", "j0").await);
        assert!(!ledger.is_current("u2", "j1").await);
    }

    #[tokio::test]
    async fn test_rotate_supersedes_previous() {
        let ledger = RefreshLedger::new();
        ledger.record("u1", "j1").await;

        assert!(ledger.rotate("u1", "j1", "j2").await);
        assert!(!ledger.is_current("u1", "j1").await);
        assert!(ledger.is_current("u1", "j2").await);

        // Replaying the old id does not move the ledger
        assert!(!ledger.rotate("u1", "j1", "j3").await);
        assert!(ledger.is_current("u1", "j2").await);
    }

    #[tokio::test]
    async fn test_rotate_unknown_identity() {
        let ledger = RefreshLedger::new();
        assert!(!ledger.rotate("u1", "j1", "j2").await);
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_forget() {
        let ledger = RefreshLedger::new();
        ledger.record("u1", "j1").await;
        ledger.record("u2", "j2").await;
        assert_eq!(ledger.len().await, 2);

        ledger.forget("u1").await;
        assert!(!ledger.is_current("u1", "j1").await);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = RefreshLedger::new();
        let b = a.clone();
        a.record("u1", "j1").await;
        assert!(b.is_current("u1", "j1").await);
    }
}
