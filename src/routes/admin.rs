use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Page Router
///
/// Server-rendered admin pages. Each page loader runs the admin guard: non-admin
/// sessions are redirected to `/` with `302 Found` instead of receiving an error.
pub fn admin_pages() -> Router<AppState> {
    Router::new()
        // GET /admin/costs
        .route("/admin/costs", get(handlers::admin_costs_page))
}

/// Admin API Router
///
/// MCP administration, mounted under `/api/mcp`. Every handler takes the `AdminUser`
/// extractor, which answers `401` for anonymous and non-admin callers.
pub fn mcp_admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/mcp/config
        .route("/config", get(handlers::get_mcp_config))
        // POST /api/mcp/config/update
        .route("/config/update", post(handlers::update_mcp_config))
        // POST /api/mcp/verify
        .route("/verify", post(handlers::verify_mcp_connection))
}
