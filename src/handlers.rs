use crate::{
    auth::{AdminUser, AuthUser},
    error::AppError,
    guard::{self, LoadError},
    mcp::{McpState, client::Completion, stream},
    models::{
        AdminPageData, McpModelsResponse, McpSettings, McpUrlsResponse, McpVerifyRequest,
        McpVerifyResponse, ParentData,
    },
    session::{ParentLoader, SessionLoader},
};
use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::Value;

// --- Pages ---

/// home
///
/// [Public Page] The home route, and the target of every guard redirect.
/// Returns the root layout data so the client can render the signed-in state.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Root layout data", body = ParentData))
)]
pub async fn home(parent: ParentData) -> Json<ParentData> {
    Json(parent)
}

/// get_session
///
/// [Public Route] Exposes the root layout data (the resolved session user, or `null`).
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Session", body = ParentData))
)]
pub async fn get_session(parent: ParentData) -> Json<ParentData> {
    Json(parent)
}

/// admin_costs_page
///
/// [Admin Page] Page load for the admin costs view. Non-admins are redirected
/// to `/` with `302 Found`; admins receive the empty page payload.
#[utoipa::path(
    get,
    path = "/admin/costs",
    responses(
        (status = 200, description = "Admin page data", body = AdminPageData),
        (status = 302, description = "Not an admin: redirect to /")
    )
)]
pub async fn admin_costs_page(
    State(loader): State<SessionLoader>,
    request: Request,
) -> Result<Json<AdminPageData>, LoadError> {
    let (parts, _body) = request.into_parts();
    guard::load_admin_page(loader.parent(&parts)).await.map(Json)
}

// --- MCP: Admin ---

/// get_mcp_config
///
/// [Admin Route] Current MCP server settings.
#[utoipa::path(
    get,
    path = "/api/mcp/config",
    responses((status = 200, description = "MCP settings", body = McpSettings))
)]
pub async fn get_mcp_config(
    AdminUser(_admin): AdminUser,
    State(mcp): State<McpState>,
) -> Json<McpSettings> {
    Json(mcp.settings().await)
}

/// update_mcp_config
///
/// [Admin Route] Replaces the MCP server settings. API configs whose key is not an
/// index into `MCP_BASE_URLS` are dropped.
#[utoipa::path(
    post,
    path = "/api/mcp/config/update",
    request_body = McpSettings,
    responses((status = 200, description = "Updated settings", body = McpSettings))
)]
pub async fn update_mcp_config(
    AdminUser(admin): AdminUser,
    State(mcp): State<McpState>,
    Json(form): Json<McpSettings>,
) -> Json<McpSettings> {
    tracing::info!(admin_id = %admin.id, "updating MCP settings");
    Json(mcp.update_settings(form).await)
}

/// verify_mcp_connection
///
/// [Admin Route] Checks that an MCP server answers `GET /v1/models`.
#[utoipa::path(
    post,
    path = "/api/mcp/verify",
    request_body = McpVerifyRequest,
    responses(
        (status = 200, description = "Reachable", body = McpVerifyResponse),
        (status = 400, description = "Unreachable")
    )
)]
pub async fn verify_mcp_connection(
    AdminUser(_admin): AdminUser,
    State(mcp): State<McpState>,
    Json(form): Json<McpVerifyRequest>,
) -> Result<Json<McpVerifyResponse>, AppError> {
    mcp.verify(&form.url, form.key.as_deref()).await?;
    Ok(Json(McpVerifyResponse {
        status: "success".to_string(),
    }))
}

// --- MCP: Signed-in users ---

/// get_mcp_urls
///
/// [Authenticated Route] The configured MCP server URLs.
#[utoipa::path(
    get,
    path = "/api/mcp/urls",
    responses((status = 200, description = "MCP URLs", body = McpUrlsResponse))
)]
pub async fn get_mcp_urls(
    AuthUser(_user): AuthUser,
    State(mcp): State<McpState>,
) -> Json<McpUrlsResponse> {
    Json(McpUrlsResponse {
        mcp_base_urls: mcp.settings().await.mcp_base_urls,
    })
}

/// get_mcp_models
///
/// [Authenticated Route] Models of every configured MCP server; empty while disabled.
#[utoipa::path(
    get,
    path = "/api/mcp/models",
    responses((status = 200, description = "MCP models", body = McpModelsResponse))
)]
pub async fn get_mcp_models(
    AuthUser(_user): AuthUser,
    State(mcp): State<McpState>,
) -> Json<McpModelsResponse> {
    Json(McpModelsResponse {
        models: mcp.list_models().await,
    })
}

/// create_mcp_chat_completion
///
/// [Authenticated Route] Proxies an OpenAI-style chat completion to the MCP server
/// serving `model`. Streams `text/event-stream` when `stream` is true.
#[utoipa::path(
    post,
    path = "/api/mcp/chat/completions",
    responses(
        (status = 200, description = "Upstream completion, JSON or an event stream"),
        (status = 400, description = "MCP disabled or unknown model")
    )
)]
pub async fn create_mcp_chat_completion(
    AuthUser(user): AuthUser,
    State(mcp): State<McpState>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    match mcp.chat_completion(&user, body).await? {
        Completion::Json(value) => Ok(Json(value).into_response()),
        Completion::Stream(upstream) => {
            let body = Body::from_stream(stream::frame_lines(upstream));
            Ok(([(header::CONTENT_TYPE, "text/event-stream")], body).into_response())
        }
    }
}
