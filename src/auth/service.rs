use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::auth::hasher::CredentialHasher;
use crate::auth::token::{fingerprint, generate_session_token, MIN_TOKEN_BYTES};
use crate::cache::SessionCache;
use crate::config::AuthConfig;
use crate::db::CredentialStore;
use crate::error::{AppError, CacheError, HashError, StoreError};

pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_REMEMBER_ME_TTL_SECS: u64 = 30 * DEFAULT_SESSION_TTL_SECS;
pub const DEFAULT_TOKEN_BYTES: usize = 32;

pub const MAX_USERNAME_CHARS: usize = 64;
/// Bounds the hashing work a single request can ask for.
pub const MAX_PASSWORD_BYTES: usize = 1024;
const MAX_TTL_SECS: u64 = 10 * 365 * DEFAULT_SESSION_TTL_SECS;

/// Session lifetime rules. Lookups never extend a session.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub session_ttl: Duration,
    pub remember_me_ttl: Duration,
    pub token_bytes: usize,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            remember_me_ttl: Duration::from_secs(DEFAULT_REMEMBER_ME_TTL_SECS),
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }
}

impl AuthPolicy {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        if config.token_bytes < MIN_TOKEN_BYTES {
            return Err(AppError::Config(format!(
                "auth.token_bytes must be at least {}",
                MIN_TOKEN_BYTES
            )));
        }
        for (name, secs) in [
            ("auth.session_ttl_secs", config.session_ttl_secs),
            ("auth.remember_me_ttl_secs", config.remember_me_ttl_secs),
        ] {
            if secs == 0 || secs > MAX_TTL_SECS {
                return Err(AppError::Config(format!(
                    "{} must be between 1 and {}",
                    name, MAX_TTL_SECS
                )));
            }
        }

        Ok(Self {
            session_ttl: Duration::from_secs(config.session_ttl_secs),
            remember_me_ttl: Duration::from_secs(config.remember_me_ttl_secs),
            token_bytes: config.token_bytes,
        })
    }
}

/// A freshly cached session.
#[derive(Clone)]
pub struct SessionGrant {
    pub token: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for SessionGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGrant")
            .field("token", &fingerprint(&self.token))
            .field("username", &self.username)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What the client should do with its username hint. Has no bearing on the
/// session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RememberHint {
    Persist {
        username: String,
        expires_at: DateTime<Utc>,
    },
    Clear,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: SessionGrant,
    pub remember: RememberHint,
}

/// Signup, login and logout over a credential store and a session cache.
///
/// A token moves `absent -> active -> (expired | revoked)`. Both terminal
/// states look the same to callers: `AppError::NotFound`.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn SessionCache>,
    hasher: Arc<CredentialHasher>,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        hasher: CredentialHasher,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            store,
            cache,
            hasher: Arc::new(hasher),
            policy,
        }
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), AppError> {
        let username = validate_credentials(username, password)?;

        let password = password.to_owned();
        let digest = self.run_hasher(move |hasher| hasher.hash(&password)).await?;

        match self.store.create(username, &digest).await {
            Ok(()) => {
                info!(username, "User registered");
                Ok(())
            }
            Err(StoreError::DuplicateUser) => {
                warn!(username, "Signup rejected: username taken");
                Err(AppError::DuplicateUser)
            }
            Err(e) => {
                error!(username, error = %e, "Signup failed");
                Err(AppError::Internal)
            }
        }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AppError> {
        let username = validate_credentials(username, password)?;

        let stored_digest = match self.store.find_by_username(username).await {
            Ok(credential) => Some(credential.password_digest),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                error!(username, error = %e, "Credential lookup failed");
                return Err(AppError::Internal);
            }
        };

        // Unknown users still pay for one verification.
        let password = password.to_owned();
        let matched = self
            .run_hasher(move |hasher| match stored_digest {
                Some(digest) => hasher.verify(&digest, &password),
                None => Ok(hasher.verify_dummy(&password)),
            })
            .await?;

        if !matched {
            warn!(username, "Login rejected");
            return Err(AppError::Unauthorized);
        }

        let token = generate_session_token(self.policy.token_bytes);
        if let Err(e) = self.cache.put(&token, username, self.policy.session_ttl).await {
            error!(username, error = %e, "Failed to cache session");
            return Err(AppError::Internal);
        }

        let issued_at = Utc::now();
        let session = SessionGrant {
            expires_at: expiry_after(issued_at, self.policy.session_ttl),
            token,
            username: username.to_string(),
            issued_at,
        };
        let remember = if remember_me {
            RememberHint::Persist {
                username: username.to_string(),
                expires_at: expiry_after(issued_at, self.policy.remember_me_ttl),
            }
        } else {
            RememberHint::Clear
        };

        info!(
            username,
            session = %fingerprint(&session.token),
            remember_me,
            "Login succeeded"
        );
        Ok(LoginOutcome { session, remember })
    }

    /// Revoke `token`. Unknown or already-expired tokens are not an error.
    ///
    /// The caller is not checked against the session's owner: anyone holding
    /// the token string can revoke it.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        match self.cache.delete(token).await {
            Ok(()) => {
                info!(session = %fingerprint(token), "Session revoked");
                Ok(())
            }
            Err(e) => {
                error!(session = %fingerprint(token), error = %e, "Failed to revoke session");
                Err(AppError::Internal)
            }
        }
    }

    /// Username behind an active session.
    pub async fn current_user(&self, token: &str) -> Result<String, AppError> {
        match self.cache.get(token).await {
            Ok(username) => Ok(username),
            Err(CacheError::NotFound) => Err(AppError::NotFound),
            Err(e) => {
                error!(session = %fingerprint(token), error = %e, "Session lookup failed");
                Err(AppError::Internal)
            }
        }
    }

    /// Argon2 is deliberately slow; keep it off the async workers.
    async fn run_hasher<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&CredentialHasher) -> Result<T, HashError> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || op(&hasher))
            .await
            .map_err(|e| {
                error!(error = %e, "Hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "Password hashing failed");
                AppError::Internal
            })
    }
}

/// Returns the trimmed username.
fn validate_credentials<'a>(username: &'a str, password: &str) -> Result<&'a str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username must not be empty".into()));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AppError::Validation(format!(
            "username must be at most {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(username)
}

fn expiry_after(from: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| from.checked_add_signed(ttl))
        .unwrap_or(from)
}
