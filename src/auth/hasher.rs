//! Argon2id password digests.
//!
//! Digests are PHC strings, so each one carries its own algorithm, cost and
//! salt. Verification always reads those from the digest, which keeps old
//! digests verifiable after the configured work factor changes.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::AuthConfig;
use crate::error::HashError;

pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

/// Hashed at construction and verified against when a username is unknown,
/// so that path costs the same as a wrong password.
const TIMING_DUMMY_PASSWORD: &str = "conduit-auth-timing-dummy";

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    dummy_digest: String,
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        let mut hasher = Self {
            params,
            dummy_digest: String::new(),
        };
        hasher.dummy_digest = hasher.hash(TIMING_DUMMY_PASSWORD)?;
        Ok(hasher)
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, HashError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let digest = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(digest.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the digest itself is unusable.
    pub fn verify(&self, digest: &str, candidate: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(digest)?;
        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Burn one verification's worth of work and report a mismatch.
    pub fn verify_dummy(&self, candidate: &str) -> bool {
        let _ = self.verify(&self.dummy_digest, candidate);
        false
    }
}
