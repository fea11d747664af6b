use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Credential, CredentialStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, username: &str, password_digest: &str) -> Result<(), StoreError> {
        match self.users.write().await.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUser),
            Entry::Vacant(slot) => {
                slot.insert(Credential::new(
                    username.to_string(),
                    password_digest.to_string(),
                ));
                Ok(())
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();
        store.create("alice", "digest-a").await.unwrap();

        let found = store.find_by_username("alice").await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_digest, "digest-a");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = InMemoryCredentialStore::new();
        store.create("alice", "digest-a").await.unwrap();

        let err = store.create("alice", "digest-b").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser));
        // First writer's digest is untouched
        assert_eq!(
            store.find_by_username("alice").await.unwrap().password_digest,
            "digest-a"
        );
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = InMemoryCredentialStore::new();
        assert!(matches!(
            store.find_by_username("nobody").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_signups_have_one_winner() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create("bob", &format!("digest-{}", i)).await })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(StoreError::DuplicateUser) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.len().await, 1);
    }
}
