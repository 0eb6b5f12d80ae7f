use serde_json::json;
use std::collections::HashMap;
use webui_admin::models::{
    AdminPageData, McpApiConfig, McpSettings, ParentData, User, UserInfo,
};

// --- Page Data ---

#[test]
fn test_admin_page_data_is_empty_object() {
    assert_eq!(serde_json::to_value(AdminPageData::default()).unwrap(), json!({}));
}

#[test]
fn test_parent_data_accepts_null_user_and_missing_role() {
    let data: ParentData = serde_json::from_value(json!({ "user": null })).unwrap();
    assert!(data.user.is_none());

    let data: ParentData = serde_json::from_value(json!({
        "user": {
            "id": "00000000-0000-0000-0000-000000000001",
            "email": "a@b.c",
            "name": null,
            "role": null
        }
    }))
    .unwrap();
    assert_eq!(data.user.unwrap().role, None);
}

// --- MCP Settings ---

#[test]
fn test_mcp_settings_wire_names() {
    let settings = McpSettings {
        enable_mcp_api: true,
        mcp_base_urls: vec!["http://a".to_string()],
        mcp_api_configs: HashMap::new(),
    };

    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({
            "ENABLE_MCP_API": true,
            "MCP_BASE_URLS": ["http://a"],
            "MCP_API_CONFIGS": {}
        })
    );
}

#[test]
fn test_mcp_settings_configs_default_when_absent() {
    let settings: McpSettings =
        serde_json::from_value(json!({ "ENABLE_MCP_API": false, "MCP_BASE_URLS": [] })).unwrap();
    assert!(settings.mcp_api_configs.is_empty());
}

#[test]
fn test_prune_keeps_only_url_indices() {
    let mut configs = HashMap::new();
    for key in ["0", "1", "2", "01", "x"] {
        configs.insert(
            key.to_string(),
            McpApiConfig {
                api_key: Some(format!("key-{key}")),
                ..Default::default()
            },
        );
    }
    let mut settings = McpSettings {
        enable_mcp_api: true,
        mcp_base_urls: vec!["http://a".to_string(), "http://b".to_string()],
        mcp_api_configs: configs,
    };

    settings.prune_api_configs();

    let mut keys: Vec<_> = settings.mcp_api_configs.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["0", "1"]);
    assert_eq!(settings.api_key(1).as_deref(), Some("key-1"));
    assert_eq!(settings.api_key(2), None);
}

#[test]
fn test_api_config_keeps_unknown_fields() {
    let raw = json!({ "api_key": "k0", "enable": false, "prefix_id": "p", "tags": ["a"] });

    let config: McpApiConfig = serde_json::from_value(raw.clone()).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("k0"));
    assert_eq!(config.extra["enable"], false);
    assert_eq!(config.extra["prefix_id"], "p");
    assert!(!config.extra.contains_key("api_key"));
    assert_eq!(serde_json::to_value(&config).unwrap(), raw);
}

#[test]
fn test_user_info_from_user() {
    let user = User {
        name: Some("Ana".to_string()),
        email: "ana@example.com".to_string(),
        ..User::with_role(Some("admin"))
    };

    let info = UserInfo::from(&user);

    assert_eq!(info.id, user.id);
    assert_eq!(info.name.as_deref(), Some("Ana"));
    assert_eq!(info.role.as_deref(), Some("admin"));
}
