use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

/// One row of the `users` table.
#[derive(Clone, FromRow)]
pub struct Credential {
    pub username: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(username: String, password_digest: String) -> Self {
        Self {
            username,
            password_digest,
            created_at: Utc::now(),
        }
    }
}

// Keep digests out of logs and panics.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password_digest", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
