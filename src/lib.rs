pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;

use actix_web::{web, HttpResponse};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use auth::{AuthPolicy, AuthService, CredentialHasher};
pub use cache::{InMemorySessionCache, PgSessionCache, SessionCache};
pub use db::{CredentialStore, DbOperations, InMemoryCredentialStore};

use crate::config::CacheBackend;

/// Health check endpoint handler
/// Returns a JSON response with server status, timestamp and pool status
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": state.db.as_ref().map(|db| db.get_pool_status()),
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pub db: Option<DbOperations>,
}

impl AppState {
    /// Connect to Postgres, apply migrations and wire the configured cache.
    pub async fn new(config: Settings) -> anyhow::Result<Self> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await
        .context("failed to connect to the credential database")?;
        db.run_migrations()
            .await
            .context("failed to apply database migrations")?;

        let cache: Arc<dyn SessionCache> = match config.cache.backend {
            CacheBackend::Postgres => Arc::new(PgSessionCache::new(db.pool())),
            CacheBackend::Memory => Arc::new(InMemorySessionCache::new()),
        };
        info!(backend = ?config.cache.backend, "Session cache ready");

        Self::assemble(config, Arc::new(db.clone()), cache, Some(db))
    }

    /// Everything in process memory; nothing survives a restart.
    pub fn in_memory(config: Settings) -> anyhow::Result<Self> {
        Self::assemble(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemorySessionCache::new()),
            None,
        )
    }

    /// Wire caller-supplied backends under the policy in `config`.
    pub fn assemble(
        config: Settings,
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        db: Option<DbOperations>,
    ) -> anyhow::Result<Self> {
        let policy = AuthPolicy::from_config(&config.auth)?;
        let hasher = CredentialHasher::from_config(&config.auth)
            .context("invalid password hashing parameters")?;

        Ok(Self {
            auth_service: Arc::new(AuthService::new(store, cache, hasher, policy)),
            config: Arc::new(config),
            db,
        })
    }

    pub async fn shutdown(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}
