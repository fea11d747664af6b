//! Authentication module for the Conduit API
//!
//! Credential hashing, session-token issuance and revocation, and the HTTP
//! adapter that carries sessions in cookies.

pub mod cookies;
pub mod handlers;
pub mod hasher;
pub mod routes;
pub mod service;
pub mod token;

pub use hasher::CredentialHasher;
pub use service::{AuthPolicy, AuthService, LoginOutcome, RememberHint, SessionGrant};
