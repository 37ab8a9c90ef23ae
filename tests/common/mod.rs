use axum::{http::StatusCode, routing::post, Json, Router};
use axum_test::TestServer;
use minivault::vault::config::OllamaConfig;
use minivault::vault::{build_router, AppState, InteractionLog, OllamaChatGenerator, StubGenerator};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Start a mock Ollama `/api/chat` that echoes the user message
/// 启动回显用户消息的模拟Ollama服务
pub async fn start_mock_ollama() -> String {
    let app = Router::new().route(
        "/api/chat",
        post(|Json(v): Json<Value>| async move {
            let model = v["model"].as_str().unwrap_or_default().to_string();
            if model != "phi3:mini" {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": format!("model '{}' not found", model)})),
                );
            }
            let user = v["messages"][1]["content"].as_str().unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({
                    "model": model,
                    "message": {"role": "assistant", "content": format!("\n echo: {} \n", user)},
                    "done": true
                })),
            )
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Address nothing listens on / 无服务监听的地址
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn create_test_server(log_dir: &Path, ollama_base_url: &str) -> TestServer {
    let ollama = OllamaConfig {
        base_url: ollama_base_url.to_string(),
        timeout_ms: 5_000,
        ..Default::default()
    };
    let state = AppState::new(
        Arc::new(StubGenerator::new()),
        Arc::new(OllamaChatGenerator::new(&ollama).unwrap()),
        Arc::new(InteractionLog::new(log_path(log_dir))),
    );
    TestServer::new(build_router(state, true).into_make_service()).unwrap()
}

pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join("logs").join("log.jsonl")
}

pub fn read_log(log_dir: &Path) -> Vec<Value> {
    std::fs::read_to_string(log_path(log_dir))
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).expect("log line is valid JSON"))
        .collect()
}
