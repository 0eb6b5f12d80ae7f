use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. The layout routes still resolve the session
/// so a signed-in client sees its user.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Home page; every admin guard redirect lands here.
        .route("/", get(handlers::home))
        // GET /api/session
        // Root layout data: `{ user }`, `user` is null when signed out.
        .route("/api/session", get(handlers::get_session))
}
