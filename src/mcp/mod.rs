//! MCP (Model Control Protocol) server management.
//!
//! Holds the runtime server settings and the model cache, and routes chat completions to
//! the server that advertised the requested model.

pub mod client;
pub mod stream;

use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{McpModel, McpSettings, User, UserInfo},
};
use client::{Completion, McpClientState};

/// Model cache tagged with the settings generation it was filled under. Every settings
/// update bumps `generation`, so a listing started under older settings can tell that its
/// server indices are stale.
#[derive(Default)]
struct ModelCache {
    generation: u64,
    models: HashMap<String, McpModel>,
}

/// McpState
///
/// Shared MCP runtime state. Locks are never held across a network call: settings are
/// snapshotted before talking to servers. Lock order is `settings` then `models`.
#[derive(Clone)]
pub struct McpState {
    settings: Arc<RwLock<McpSettings>>,
    models: Arc<RwLock<ModelCache>>,
    client: McpClientState,
    forward_user_info: bool,
}

impl McpState {
    pub fn new(client: McpClientState, config: &AppConfig) -> Self {
        let settings = McpSettings {
            enable_mcp_api: config.enable_mcp_api,
            mcp_base_urls: config.mcp_base_urls.clone(),
            mcp_api_configs: HashMap::new(),
        };

        Self {
            settings: Arc::new(RwLock::new(settings)),
            models: Arc::new(RwLock::new(ModelCache::default())),
            client,
            forward_user_info: config.forward_user_info,
        }
    }

    pub async fn settings(&self) -> McpSettings {
        self.settings.read().await.clone()
    }

    /// Replaces the settings, dropping per-server configs that no longer match a URL index.
    /// The model cache is cleared since cached server indices may have shifted.
    pub async fn update_settings(&self, mut form: McpSettings) -> McpSettings {
        form.prune_api_configs();

        let mut settings = self.settings.write().await;
        let mut cache = self.models.write().await;
        *settings = form.clone();
        cache.generation += 1;
        cache.models.clear();
        drop(cache);
        drop(settings);

        tracing::info!(
            enabled = form.enable_mcp_api,
            servers = form.mcp_base_urls.len(),
            "MCP settings updated"
        );
        form
    }

    pub async fn verify(&self, url: &str, key: Option<&str>) -> Result<(), AppError> {
        if self.client.verify_connection(url, key).await {
            Ok(())
        } else {
            Err(AppError::BadRequest(
                "Could not connect to the MCP server".to_string(),
            ))
        }
    }

    pub async fn cached_model(&self, model_id: &str) -> Option<McpModel> {
        self.models.read().await.models.get(model_id).cloned()
    }

    /// list_models
    ///
    /// Queries every configured server in index order. Each returned model carries the
    /// index of the server it came from; the cache accumulates every index per model id.
    /// Returns an empty list while the MCP API is disabled. If the settings change while
    /// servers are being queried, the listing is still returned but no longer cached.
    pub async fn list_models(&self) -> Vec<McpModel> {
        let (settings, generation) = {
            let settings = self.settings.read().await;
            let generation = self.models.read().await.generation;
            (settings.clone(), generation)
        };
        if !settings.enable_mcp_api {
            return vec![];
        }

        let mut listed = Vec::new();
        for (idx, url) in settings.mcp_base_urls.iter().enumerate() {
            let key = settings.api_key(idx);
            let mut server_models = self.client.get_models(url, key.as_deref()).await;

            for model in server_models.iter_mut() {
                if !model.urls.contains(&idx) {
                    model.urls.push(idx);
                }
            }

            let mut cache = self.models.write().await;
            if cache.generation == generation {
                for model in &server_models {
                    cache
                        .models
                        .entry(model.id.clone())
                        .and_modify(|cached| {
                            if !cached.urls.contains(&idx) {
                                cached.urls.push(idx);
                            }
                        })
                        .or_insert_with(|| model.clone());
                }
            } else {
                tracing::debug!(%url, "MCP settings changed during listing, not caching");
            }
            drop(cache);

            tracing::debug!(%url, count = server_models.len(), "listed MCP models");
            listed.extend(server_models);
        }

        listed
    }

    /// Cache lookup, refreshing the cache once on a miss.
    pub async fn resolve_model(&self, model_id: &str) -> Option<McpModel> {
        if let Some(model) = self.cached_model(model_id).await {
            return Some(model);
        }
        self.list_models().await;
        self.cached_model(model_id).await
    }

    /// chat_completion
    ///
    /// Proxies a chat completion request to the first server serving `body.model`.
    pub async fn chat_completion(&self, user: &User, mut body: Value) -> Result<Completion, AppError> {
        let settings = self.settings().await;
        if !settings.enable_mcp_api {
            return Err(AppError::BadRequest("MCP API is not enabled".to_string()));
        }

        let Some(payload) = body.as_object_mut() else {
            return Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        let model_id = payload
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let model = self
            .resolve_model(&model_id)
            .await
            .ok_or_else(|| AppError::BadRequest(format!("Model not found: {model_id}")))?;

        let url_idx = *model.urls.first().ok_or_else(|| {
            AppError::Internal(format!("model {model_id} has no server index"))
        })?;
        // Settings may have changed since the cache was filled.
        let url = settings
            .mcp_base_urls
            .get(url_idx)
            .ok_or_else(|| AppError::BadRequest(format!("Model not found: {model_id}")))?;
        let api_key = settings.api_key(url_idx);

        if self.forward_user_info {
            let info = serde_json::to_value(UserInfo::from(user))
                .map_err(|e| AppError::Internal(e.to_string()))?;
            payload.insert("user_info".to_string(), info);
        }

        let stream = payload
            .get("stream")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        payload.insert("stream".to_string(), Value::Bool(stream));
        payload
            .entry("messages")
            .or_insert_with(|| Value::Array(vec![]));

        tracing::info!(model = %model_id, server = url_idx, stream, "proxying MCP chat completion");

        self.client
            .create_chat_completion(url, api_key.as_deref(), body, stream)
            .await
    }
}
