use actix_web::web;

use super::handlers;

/// Mounts the auth group. Callers choose the prefix (`/api` in the binary).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .app_data(handlers::json_config())
            .route("/signup", web::post().to(handlers::signup))
            .route("/login", web::post().to(handlers::login))
            .route("/logout", web::post().to(handlers::logout))
            .route("/session", web::get().to(handlers::session)),
    );
}
