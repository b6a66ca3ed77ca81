use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use sao_chat::backend::HttpBackend;
use sao_chat::config::BackendConfig;

/// Builds an `HttpBackend` against a mock server, with the default
/// `/chatbot` scope.
#[allow(dead_code)]
pub fn backend_for(base_url: &str) -> Arc<HttpBackend> {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        chatbot_scope: "/chatbot".to_string(),
        timeout_seconds: 5,
    };
    Arc::new(HttpBackend::new(&config).expect("failed to build backend"))
}

/// Successful envelope around `data`.
#[allow(dead_code)]
pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// The Budget/Finance session list as the server returns it.
#[allow(dead_code)]
pub fn budget_finance_json() -> Value {
    json!([
        { "session_id": "1", "title": "Budget", "created_at": "2025-01-01", "is_pinned": false },
        { "session_id": "2", "title": "Finance", "created_at": "2025-01-02", "is_pinned": false }
    ])
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
