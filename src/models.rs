use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::HashMap;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Session Schemas ---

/// User
///
/// The session user record, read from the `public.profiles` table. The role is the RBAC
/// field; it is nullable in the table and only the exact value `"admin"` grants admin access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl User {
    /// Convenience constructor for a user with the given role.
    pub fn with_role(role: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: String::new(),
            name: None,
            role: role.map(str::to_string),
        }
    }
}

/// ParentData
///
/// The data produced by the root layout loader and handed down to every page loader.
/// `user` is `null` when the request carries no valid session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ParentData {
    pub user: Option<User>,
}

/// AdminPageData
///
/// Page payload of the admin costs page. Intentionally empty: serializes to `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminPageData {}

// --- MCP Schemas ---

/// McpApiConfig
///
/// Per-server settings, keyed by the server's index in `MCP_BASE_URLS`. Only `api_key` is
/// read here; every other field the admin UI stores is kept in `extra` and returned as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(flatten)]
    #[ts(skip)]
    #[schema(ignore)]
    pub extra: serde_json::Map<String, Value>,
}

/// McpSettings
///
/// Runtime MCP settings, both the body of `POST /api/mcp/config/update` and the
/// response of `GET /api/mcp/config`. Field names match the admin UI's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpSettings {
    #[serde(rename = "ENABLE_MCP_API")]
    pub enable_mcp_api: bool,
    #[serde(rename = "MCP_BASE_URLS")]
    pub mcp_base_urls: Vec<String>,
    #[serde(rename = "MCP_API_CONFIGS", default)]
    pub mcp_api_configs: HashMap<String, McpApiConfig>,
}

impl McpSettings {
    /// The API key configured for the server at `idx`, if any.
    pub fn api_key(&self, idx: usize) -> Option<String> {
        self.mcp_api_configs
            .get(&idx.to_string())
            .and_then(|c| c.api_key.clone())
    }

    /// Drops per-server configs whose key is not an index into `mcp_base_urls`.
    pub fn prune_api_configs(&mut self) {
        let len = self.mcp_base_urls.len();
        self.mcp_api_configs
            .retain(|key, _| (0..len).any(|idx| idx.to_string() == *key));
    }
}

/// McpUrlsResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpUrlsResponse {
    #[serde(rename = "MCP_BASE_URLS")]
    pub mcp_base_urls: Vec<String>,
}

/// McpVerifyRequest
///
/// Input payload for `POST /api/mcp/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpVerifyRequest {
    #[schema(example = "http://localhost:8080")]
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
}

/// McpVerifyResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpVerifyResponse {
    pub status: String,
}

/// McpCapabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpCapabilities {
    pub chat: bool,
    pub vision: bool,
    pub tools: bool,
}

/// McpModelMeta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpModelMeta {
    pub profile_image_url: String,
    pub description: String,
    pub capabilities: McpCapabilities,
}

/// McpModel
///
/// A model advertised by an MCP server, normalized into the model list format the UI
/// consumes. `urls` holds the indices of every configured server that serves this model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpModel {
    pub id: String,
    pub name: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    /// The raw entry returned by the server.
    #[schema(value_type = Object)]
    pub mcp: Value,
    pub meta: McpModelMeta,
    #[serde(default)]
    pub urls: Vec<usize>,
}

/// McpModelsResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct McpModelsResponse {
    pub models: Vec<McpModel>,
}

/// UserInfo
///
/// Identity block attached to proxied chat completion bodies when forwarding is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserInfo {
    pub name: Option<String>,
    pub id: Uuid,
    pub email: String,
    pub role: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}
