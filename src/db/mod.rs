//! Durable credential storage.
//!
//! `DbOperations` is the Postgres-backed store; `InMemoryCredentialStore`
//! backs development runs and tests.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::InMemoryCredentialStore;
pub use models::Credential;
pub use operations::{DbOperations, DbPoolStatus};

/// Username -> password digest mapping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert-if-absent. The uniqueness check happens inside the store, in the
    /// same step as the insert.
    async fn create(&self, username: &str, password_digest: &str) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError>;
}
