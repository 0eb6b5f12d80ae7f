use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::{StreamExt, stream::BoxStream};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

use crate::{
    error::AppError,
    models::{McpCapabilities, McpModel, McpModelMeta},
};

const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);
const MODELS_TIMEOUT: Duration = Duration::from_secs(10);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

const MODEL_IMAGE_URL: &str = "/static/favicon.png";
const DEFAULT_MODEL_DESCRIPTION: &str = "MCP model";

/// Raw response body chunks of a streamed completion.
pub type ByteStream = BoxStream<'static, Result<Bytes, AppError>>;

/// Completion
///
/// Result of a proxied chat completion: the full JSON body, or the upstream byte stream
/// when the caller asked for `stream: true`.
pub enum Completion {
    Json(Value),
    Stream(ByteStream),
}

/// McpClient Contract
///
/// Talks to an MCP server's OpenAI-compatible HTTP API. `HttpMcpClient` is the real
/// implementation; tests provide in-memory mocks.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// `GET {url}/v1/models` succeeds. Never errors: failures are logged and yield `false`.
    async fn verify_connection(&self, url: &str, api_key: Option<&str>) -> bool;

    /// Models served by `url`, normalized. Failures are logged and yield an empty list.
    async fn get_models(&self, url: &str, api_key: Option<&str>) -> Vec<McpModel>;

    /// `POST {url}/v1/chat/completions` with `body` as the JSON payload.
    async fn create_chat_completion(
        &self,
        url: &str,
        api_key: Option<&str>,
        body: Value,
        stream: bool,
    ) -> Result<Completion, AppError>;
}

pub type McpClientState = Arc<dyn McpClient>;

/// HttpMcpClient
///
/// `McpClient` over `reqwest`. Non-streaming calls carry a total timeout; streamed
/// completions rely on the client's read timeout so long generations are not cut off.
#[derive(Clone)]
pub struct HttpMcpClient {
    http: reqwest::Client,
}

impl HttpMcpClient {
    pub fn new() -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .read_timeout(COMPLETION_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    fn get_models_request(&self, url: &str, api_key: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.http.get(format!("{url}/v1/models"));
        match api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_model_entries(
        &self,
        url: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<Value>, reqwest::Error> {
        let body: Value = self
            .get_models_request(url, api_key)
            .timeout(MODELS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl McpClient for HttpMcpClient {
    async fn verify_connection(&self, url: &str, api_key: Option<&str>) -> bool {
        let result = self
            .get_models_request(url, api_key)
            .timeout(VERIFY_TIMEOUT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(%url, "MCP connection check failed: {}", e);
                false
            }
        }
    }

    async fn get_models(&self, url: &str, api_key: Option<&str>) -> Vec<McpModel> {
        match self.fetch_model_entries(url, api_key).await {
            Ok(entries) => entries.into_iter().map(format_model).collect(),
            Err(e) => {
                tracing::error!(%url, "failed to list MCP models: {}", e);
                vec![]
            }
        }
    }

    async fn create_chat_completion(
        &self,
        url: &str,
        api_key: Option<&str>,
        body: Value,
        stream: bool,
    ) -> Result<Completion, AppError> {
        let mut request = self
            .http
            .post(format!("{url}/v1/chat/completions"))
            .json(&body);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }
        if !stream {
            request = request.timeout(COMPLETION_TIMEOUT);
        }

        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .inspect_err(|e| tracing::error!(%url, "MCP chat completion failed: {}", e))?;

        if stream {
            let chunks = response.bytes_stream().map(|chunk| chunk.map_err(AppError::from));
            Ok(Completion::Stream(chunks.boxed()))
        } else {
            Ok(Completion::Json(response.json().await?))
        }
    }
}

/// format_model
///
/// Normalizes one `data[]` entry of `/v1/models` into an `McpModel`.
/// `urls` is left empty; the caller tags the model with its server index.
pub fn format_model(raw: Value) -> McpModel {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());
    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODEL_DESCRIPTION)
        .to_string();

    let capability = |key: &str| {
        raw.get("capabilities")
            .and_then(|caps| caps.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };
    let capabilities = McpCapabilities {
        chat: true,
        vision: capability("vision"),
        tools: capability("tools"),
    };

    McpModel {
        created: raw.get("created").and_then(Value::as_i64).unwrap_or(0),
        id,
        name,
        object: "model".to_string(),
        owned_by: "mcp".to_string(),
        meta: McpModelMeta {
            profile_image_url: MODEL_IMAGE_URL.to_string(),
            description,
            capabilities,
        },
        urls: vec![],
        mcp: raw,
    }
}
