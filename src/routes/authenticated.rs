use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// MCP endpoints available to verified users. Mounted under `/api/mcp`; every handler
/// takes `AuthUser`, which rejects anonymous and unverified callers.
pub fn mcp_user_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/mcp/urls
        .route("/urls", get(handlers::get_mcp_urls))
        // GET /api/mcp/models
        // Lists every server's models and refreshes the model cache.
        .route("/models", get(handlers::get_mcp_models))
        // POST /api/mcp/chat/completions
        // Proxied to the server that advertised the requested model.
        .route("/chat/completions", post(handlers::create_mcp_chat_completion))
}
