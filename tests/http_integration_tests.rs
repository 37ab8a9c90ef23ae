//! HTTP integration tests for MiniVault
//! MiniVault的HTTP集成测试
//!
//! The full router runs against the real generators; the Ollama side is an
//! in-process mock server.
//! 完整路由使用真实生成器运行；Ollama端为进程内模拟服务

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_test_server, read_log, start_mock_ollama, unreachable_base_url};

#[tokio::test]
async fn test_explain_entropy_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &unreachable_base_url().await);

    let resp = server
        .post("/generate")
        .json(&json!({"prompt": "  explain entropy  "}))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let text = body["response"].as_str().unwrap();
    assert!(text.contains("explain entropy"));
    assert!(!text.contains("  explain entropy  "));

    let log = read_log(tmp.path());
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["model"], "stubbed");
    assert_eq!(log[0]["prompt"], "explain entropy");
    assert_eq!(log[0]["response"], text);
}

#[tokio::test]
async fn test_code_prompt_uses_code_templates() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &unreachable_base_url().await);

    for prompt in ["Write some CODE please", "what is code review"] {
        let body: Value = server
            .post("/generate")
            .json(&json!({"prompt": prompt}))
            .await
            .json();
        let text = body["response"].as_str().unwrap();
        assert!(text.contains(prompt));
        assert!(
            text.starts_with(&format!("Here's a code example for '{}'", prompt))
                || text.starts_with(&format!("For coding questions like '{}'", prompt)),
            "unexpected template: {}",
            text
        );
    }
    assert_eq!(read_log(tmp.path()).len(), 2);
}

#[tokio::test]
async fn test_generate_llama_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &start_mock_ollama().await);

    let resp = server
        .post("/generate-llama")
        .json(&json!({"prompt": "  why is the sky blue? "}))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body, json!({"response": "echo: why is the sky blue?"}));

    let log = read_log(tmp.path());
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["model"], "phi3:mini");
    assert_eq!(log[0]["prompt"], "why is the sky blue?");
    assert_eq!(log[0]["response"], "echo: why is the sky blue?");
}

#[tokio::test]
async fn test_unreachable_backend_is_500_without_log() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &unreachable_base_url().await);

    let resp = server
        .post("/generate-llama")
        .json(&json!({"prompt": "hello"}))
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Ollama generation failed: "));
    assert!(detail.len() > "Ollama generation failed: ".len());
    assert!(read_log(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_rejections_write_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &start_mock_ollama().await);
    let padded_too_long = format!("  {}  ", "b".repeat(5001));

    for route in ["/generate", "/generate-llama"] {
        let resp = server.post(route).json(&json!({"prompt": ""})).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_json(&json!({"detail": "Prompt cannot be empty"}));

        let resp = server
            .post(route)
            .json(&json!({"prompt": padded_too_long}))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_json(&json!({"detail": "Prompt too long (max 5000 characters)"}));
    }
    assert!(!common::log_path(tmp.path()).exists());
}

#[tokio::test]
async fn test_each_success_appends_exactly_one_line() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &start_mock_ollama().await);

    let mut responses = Vec::new();
    for (i, route) in ["/generate", "/generate-llama", "/generate"].iter().enumerate() {
        let prompt = format!("how to step {}", i);
        let body: Value = server
            .post(route)
            .json(&json!({"prompt": prompt}))
            .await
            .json();
        responses.push((prompt, body["response"].as_str().unwrap().to_string()));

        let _ = server.get("/health").await;
        assert_eq!(read_log(tmp.path()).len(), i + 1);
    }

    let log = read_log(tmp.path());
    for (line, (prompt, response)) in log.iter().zip(responses.iter()) {
        assert_eq!(line["prompt"], prompt.as_str());
        assert_eq!(line["response"], response.as_str());
        assert!(line["timestamp"].is_string());
    }
    assert_eq!(log[1]["model"], "phi3:mini");
}

#[tokio::test]
async fn test_root_and_health() {
    let tmp = tempfile::tempdir().unwrap();
    let server = create_test_server(tmp.path(), &unreachable_base_url().await);

    let root: Value = server.get("/").await.json();
    assert_eq!(root["message"], "MiniVault API is running!");
    assert!(root["endpoints"]["generate-llama"].is_string());

    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let health: Value = resp.json();
    assert_eq!(health["status"], "healthy");
}
