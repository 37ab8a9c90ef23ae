//! MiniVault prompt gateway / MiniVault提示词网关
//!
//! Requests are validated, handed to the generator bound to their route, and
//! every successful generation is appended to the interaction log.

pub mod config;
pub mod generators;
pub mod http_gateway;
pub mod interaction_log;
pub mod types;
pub mod validation;


pub use config::{CliArgs, VaultConfig};
pub use generators::{GenerationError, OllamaChatGenerator, ResponseGenerator, StubGenerator};
pub use http_gateway::{build_router, ApiError, AppState, HttpGateway};
pub use interaction_log::{InteractionLog, LogError};
pub use validation::{validate_prompt, PromptError, MAX_PROMPT_CHARS};
