use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::vault::config::OllamaConfig;
use crate::vault::generators::{GenerationError, ResponseGenerator};

const BACKEND: &str = "Ollama";

/// Generator backed by a local Ollama `/api/chat` endpoint.
/// 由本地Ollama聊天接口支撑的生成器
pub struct OllamaChatGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl OllamaChatGenerator {
    /// Build the generator and its HTTP client once; the client is reused for
    /// every request.
    pub fn new(config: &OllamaConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GenerationError::backend(BACKEND, e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &OllamaConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        }
    }

    fn join_url(&self, path: &str) -> String {
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        base.push_str(path.trim_start_matches('/'));
        base
    }

    fn build_chat_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": prompt},
            ],
            "stream": false,
        })
    }

    fn extract_error_message(v: &Value) -> Option<String> {
        v.get("error")
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
    }

    fn fail(message: impl Into<String>) -> GenerationError {
        GenerationError::backend(BACKEND, message)
    }
}

#[async_trait]
impl ResponseGenerator for OllamaChatGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.join_url("api/chat");
        tracing::debug!(%url, model = %self.model, "calling ollama chat");

        let resp = self
            .client
            .post(url)
            .json(&self.build_chat_body(prompt))
            .send()
            .await
            .map_err(|e| Self::fail(e.to_string()))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| Self::fail(e.to_string()))?;
        let parsed = serde_json::from_slice::<Value>(&body);

        if !status.is_success() {
            let extra = parsed.ok().as_ref().and_then(Self::extract_error_message);
            return Err(Self::fail(match extra {
                Some(m) => format!("upstream status: {}: {}", status.as_u16(), m),
                None => format!("upstream status: {}", status.as_u16()),
            }));
        }

        let parsed = parsed.map_err(|e| Self::fail(format!("invalid response: {}", e)))?;
        let content = parsed
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| Self::fail("invalid response: missing message content"))?;

        Ok(content.trim().to_string())
    }
}
