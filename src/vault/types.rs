//! Request, response and persisted record shapes
//! 请求、响应与持久化记录结构

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generation request body / 生成请求体
///
/// A body without `prompt` deserializes to an empty prompt so it is rejected
/// by validation like any other empty input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Generation response body / 生成响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// One line of the interaction log / 交互日志中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: String,
    pub model: String,
    pub prompt: String,
    pub response: String,
}

impl InteractionRecord {
    pub fn new(
        prompt: impl Into<String>,
        response: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: model.into(),
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Root endpoint metadata / 根端点元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

/// Liveness report / 存活状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// Body of every failed response / 所有失败响应的消息体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
