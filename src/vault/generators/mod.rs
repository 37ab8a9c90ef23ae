pub mod ollama_chat;
pub mod stub;

pub use ollama_chat::OllamaChatGenerator;
pub use stub::StubGenerator;

use async_trait::async_trait;

/// Failure of a response generator / 响应生成器失败
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("{backend} generation failed: {message}")]
    Backend { backend: String, message: String },
}

impl GenerationError {
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Turns a validated prompt into response text.
/// 将已校验的提示词转换为响应文本
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Identifier written to the `model` field of the interaction log.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
