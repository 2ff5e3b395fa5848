//! In-memory identity store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::IdentityStore;
use crate::auth::models::Identity;
use crate::error::{Error, Result};

/// Identity records held in process memory, keyed by id
#[derive(Clone, Default)]
pub struct MemoryStore {
    identities: Arc<RwLock<HashMap<String, Identity>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of identities. Duplicate emails are rejected.
    pub fn from_identities(identities: Vec<Identity>) -> Result<Self> {
        let mut map: HashMap<String, Identity> = HashMap::with_capacity(identities.len());
        for identity in identities {
            if map.values().any(|existing| existing.email == identity.email) {
                return Err(Error::Store(format!(
                    "Duplicate identity email: {}",
                    identity.email
                )));
            }
            map.insert(identity.id.clone(), identity);
        }
        Ok(Self {
            identities: Arc::new(RwLock::new(map)),
        })
    }

    /// Load identities from a JSON array file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let identities: Vec<Identity> = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} identities from {}",
            identities.len(),
            path.display()
        );
        Self::from_identities(identities)
    }

    /// Insert or replace an identity
    pub async fn insert(&self, identity: Identity) {
        self.identities
            .write()
            .await
            .insert(identity.id.clone(), identity);
    }

    /// Flip the active flag; returns false if the id is unknown
    pub async fn set_active(&self, id: &str, active: bool) -> bool {
        match self.identities.write().await.get_mut(id) {
            Some(identity) => {
                identity.is_active = active;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) -> Option<Identity> {
        self.identities.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .await
            .values()
            .find(|identity| identity.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>> {
        Ok(self.identities.read().await.get(id).cloned())
    }

    async fn record_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(identity) = self.identities.write().await.get_mut(id) {
            identity.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        let identity = Identity::new("itadmin@crms.local", "hash", Role::ItAdmin);
        let store = MemoryStore::from_identities(vec![identity.clone()]).unwrap();

        let by_email = store.find_by_email("itadmin@crms.local").await.unwrap();
        assert_eq!(by_email.unwrap().id, identity.id);

        let by_id = store.find_by_id(&identity.id).await.unwrap();
        assert_eq!(by_id.unwrap().email, "itadmin@crms.local");

        assert!(store.find_by_email("nobody@crms.local").await.unwrap().is_none());
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_last_login() {
        let identity = Identity::new("a@crms.local", "hash", Role::GenelMudur);
        let store = MemoryStore::new();
        store.insert(identity.clone()).await;

        let at = Utc::now();
        store.record_last_login(&identity.id, at).await.unwrap();

        let stored = store.find_by_id(&identity.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login_at, Some(at));
    }

    #[tokio::test]
    async fn test_set_active_and_remove() {
        let identity = Identity::new("a@crms.local", "hash", Role::SatisMuduru);
        let store = MemoryStore::new();
        store.insert(identity.clone()).await;

        assert!(store.set_active(&identity.id, false).await);
        assert!(!store.find_by_id(&identity.id).await.unwrap().unwrap().is_active);
        assert!(!store.set_active("missing", false).await);

        assert!(store.remove(&identity.id).await.is_some());
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let a = Identity::new("dup@crms.local", "h", Role::ItAdmin);
        let b = Identity::new("dup@crms.local", "h", Role::GenelMudur);
        assert!(matches!(
            MemoryStore::from_identities(vec![a, b]),
            Err(Error::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"[{"id":"1","email":"mudur.a@crms.local","passwordHash":"$2b$04$x","role":"SATIS_MUDURU","team":"A","isActive":false}]"#,
        )
        .unwrap();

        let store = MemoryStore::from_json_file(&path).unwrap();
        assert_eq!(store.len().await, 1);
        let identity = store.find_by_id("1").await.unwrap().unwrap();
        assert!(!identity.is_active);
    }
}
