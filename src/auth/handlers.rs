use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::auth::cookies::{expired_session_cookie, remember_cookie, session_cookie};
use crate::error::AppError;
use crate::{AppState, Result};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session_token: Option<String>,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("remember_me", &self.remember_me)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
}

/// Turn body decoding failures into `AppError::Validation` without echoing
/// the submitted body back.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = match err {
                JsonPayloadError::ContentType => "expected an application/json body",
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                    "request body too large"
                }
                _ => "malformed request body",
            };
            AppError::Validation(message.to_string()).into()
        })
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received signup request for username: {}", req.username);
    state.auth_service.sign_up(&req.username, &req.password).await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "registered successfully",
    }))
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received login request for username: {}", req.username);
    let outcome = state
        .auth_service
        .login(&req.username, &req.password, req.remember_me)
        .await?;

    let cookies = &state.config.cookies;
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(cookies, &outcome.session))
        .cookie(remember_cookie(cookies, &outcome.remember))
        .json(MessageResponse {
            message: "logged in successfully",
        }))
}

/// Token comes from the body's `sessionToken`, else from the session cookie.
pub async fn logout(
    req: HttpRequest,
    body: Option<web::Json<LogoutRequest>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let cookies = &state.config.cookies;
    let token = body
        .and_then(|b| b.into_inner().session_token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            req.cookie(&cookies.session_name)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty())
        });

    match token {
        Some(token) => state.auth_service.logout(&token).await?,
        None => debug!("Logout without a session token"),
    }

    Ok(HttpResponse::Ok()
        .cookie(expired_session_cookie(cookies))
        .json(MessageResponse {
            message: "logged out successfully",
        }))
}

/// Who the session cookie belongs to.
pub async fn session(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let token = req
        .cookie(&state.config.cookies.session_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::NotFound)?;

    let username = state.auth_service.current_user(&token).await?;
    Ok(HttpResponse::Ok().json(SessionResponse { username }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_defaults_remember_me() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw"}"#).unwrap();
        assert!(!req.remember_me);

        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw","rememberMe":true}"#)
                .unwrap();
        assert!(req.remember_me);
    }

    #[test]
    fn test_request_debug_hides_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"hunter2"}"#).unwrap();
        let rendered = format!("{:?}", req);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_logout_request_token_is_optional() {
        let req: LogoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.session_token.is_none());

        let req: LogoutRequest = serde_json::from_str(r#"{"sessionToken":"tok"}"#).unwrap();
        assert_eq!(req.session_token.as_deref(), Some("tok"));
    }
}
