use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

/// Caller-visible error taxonomy.
///
/// Messages never carry driver or cache text; infrastructure detail is logged
/// where it gets collapsed into `Internal`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Username already taken")]
    DuplicateUser,

    #[error("Invalid username or password")]
    Unauthorized,

    #[error("Session not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Config errors only surface during bootstrap; keep them opaque on the wire.
        let message = match self {
            AppError::Config(_) => AppError::Internal.to_string(),
            other => other.to_string(),
        };
        let response = json!({
            "error": {
                "status": status.as_u16(),
                "message": message
            }
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::UNAUTHORIZED,
            AppError::Internal | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures reported by a credential store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Username already exists")]
    DuplicateUser,

    #[error("Credential not found")]
    NotFound,

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateUser
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Failures reported by a session cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Session not found")]
    NotFound,

    #[error("Session cache unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CacheError::NotFound,
            _ => CacheError::Unavailable(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Password hashing failed: {0}")]
    Failure(String),
}

impl From<argon2::password_hash::Error> for HashError {
    fn from(err: argon2::password_hash::Error) -> Self {
        HashError::Failure(err.to_string())
    }
}

impl From<argon2::Error> for HashError {
    fn from(err: argon2::Error) -> Self {
        HashError::Failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = config::ConfigError::NotFound(String::from("key not found"));
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(_)));

        let store_err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(store_err, StoreError::NotFound));

        let store_err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(store_err, StoreError::Unavailable(_)));

        let cache_err: CacheError = sqlx::Error::PoolClosed.into();
        assert!(matches!(cache_err, CacheError::Unavailable(_)));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateUser.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Validation("invalid input".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Validation("username must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: username must not be empty");
        assert_eq!(AppError::Unauthorized.to_string(), "Invalid username or password");
        assert_eq!(AppError::Internal.to_string(), "Internal server error");
    }

    #[actix_web::test]
    async fn test_config_error_body_is_opaque() {
        let err = AppError::Config("database.url missing".to_string());
        let response = err.error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(!text.contains("database.url"));
        assert!(text.contains("Internal server error"));
    }
}
