//! Cookie shapes for session and remember-me values.
//!
//! Only names, values, expiry and flags live here; the handlers decide when
//! to attach them.

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};

use crate::auth::service::{RememberHint, SessionGrant};
use crate::config::CookieConfig;

fn to_offset(at: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn base(name: &str, value: String, expires: OffsetDateTime, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(expires)
        .finish()
}

/// Carries the session token; expires with the cached session.
pub fn session_cookie(config: &CookieConfig, grant: &SessionGrant) -> Cookie<'static> {
    base(
        &config.session_name,
        grant.token.clone(),
        to_offset(grant.expires_at),
        config.secure,
    )
}

/// Overwrites any session cookie the client holds.
pub fn expired_session_cookie(config: &CookieConfig) -> Cookie<'static> {
    base(
        &config.session_name,
        String::new(),
        OffsetDateTime::UNIX_EPOCH,
        config.secure,
    )
}

/// Username hint kept for the remember-me window, or cleared immediately.
pub fn remember_cookie(config: &CookieConfig, hint: &RememberHint) -> Cookie<'static> {
    match hint {
        RememberHint::Persist {
            username,
            expires_at,
        } => base(
            &config.remember_name,
            username.clone(),
            to_offset(*expires_at),
            config.secure,
        ),
        RememberHint::Clear => base(
            &config.remember_name,
            String::new(),
            OffsetDateTime::UNIX_EPOCH,
            config.secure,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> CookieConfig {
        CookieConfig {
            session_name: "session_token".into(),
            remember_name: "rememberMe".into(),
            secure: true,
        }
    }

    #[test]
    fn test_session_cookie() {
        let now = Utc::now();
        let grant = SessionGrant {
            token: "tok".into(),
            username: "alice".into(),
            issued_at: now,
            expires_at: now + Duration::days(1),
        };
        let cookie = session_cookie(&config(), &grant);

        assert_eq!(cookie.name(), "session_token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(grant.expires_at.timestamp())
        );
    }

    #[test]
    fn test_remember_cookie_persist_and_clear() {
        let expires_at = Utc::now() + Duration::days(30);
        let persist = remember_cookie(
            &config(),
            &RememberHint::Persist {
                username: "alice".into(),
                expires_at,
            },
        );
        assert_eq!(persist.name(), "rememberMe");
        assert_eq!(persist.value(), "alice");
        assert_eq!(
            persist.expires_datetime().map(|t| t.unix_timestamp()),
            Some(expires_at.timestamp())
        );

        let clear = remember_cookie(&config(), &RememberHint::Clear);
        assert_eq!(clear.value(), "");
        assert_eq!(clear.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(clear.http_only(), Some(true));
    }

    #[test]
    fn test_expired_session_cookie() {
        let cookie = expired_session_cookie(&config());
        assert_eq!(cookie.name(), "session_token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
