use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod mcp;
pub mod models;
pub mod repository;
pub mod session;

// Routers grouped by access level (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use mcp::{
    McpState,
    client::{HttpMcpClient, McpClient, McpClientState},
};
pub use repository::{PostgresRepository, RepositoryState};
pub use session::{ParentLoader, SessionLoader};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::get_session, handlers::admin_costs_page,
        handlers::get_mcp_config, handlers::update_mcp_config, handlers::verify_mcp_connection,
        handlers::get_mcp_urls, handlers::get_mcp_models, handlers::create_mcp_chat_completion
    ),
    components(
        schemas(
            models::User, models::ParentData, models::AdminPageData, models::McpSettings,
            models::McpApiConfig, models::McpUrlsResponse, models::McpVerifyRequest,
            models::McpVerifyResponse, models::McpModel, models::McpModelMeta,
            models::McpCapabilities, models::McpModelsResponse,
        )
    ),
    tags(
        (name = "webui-admin", description = "Admin section and MCP server management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of every shared service. Handlers pull the pieces
/// they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: user profile lookups.
    pub repo: RepositoryState,
    /// MCP runtime settings, model cache and HTTP client.
    pub mcp: McpState,
    /// Configuration loaded at startup.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for McpState {
    fn from_ref(app_state: &AppState) -> McpState {
        app_state.mcp.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for SessionLoader {
    fn from_ref(app_state: &AppState) -> SessionLoader {
        SessionLoader::new(app_state.repo.clone(), app_state.config.clone())
    }
}

/// create_router
///
/// Assembles the routing structure, scoped middleware, observability layers and state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Access is enforced by the `AuthUser` / `AdminUser` extractor on each handler, so the
    // session is resolved once per request.
    let mcp_api = authenticated::mcp_user_routes().merge(admin::mcp_admin_routes());

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(admin::admin_pages())
        .nest("/api/mcp", mcp_api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying method, URI and the `x-request-id` set above, so every log
/// line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
