//! HTTP gateway implementation for MiniVault
//! MiniVault的HTTP gateway实现

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

use crate::vault::config::VaultConfig;
use crate::vault::generators::{GenerationError, ResponseGenerator};
use crate::vault::interaction_log::InteractionLog;
use crate::vault::types::{ErrorBody, GenerateResponse, HealthStatus, PromptRequest, ServiceInfo};
use crate::vault::validation::{validate_prompt, PromptError};

/// HTTP gateway server / HTTP网关服务器
pub struct HttpGateway {
    /// Server configuration / 服务器配置
    config: Arc<VaultConfig>,
    state: AppState,
}

/// Application state / 应用状态
///
/// Each generation route is bound to one generator here; handlers never look
/// at which implementation they were given.
#[derive(Clone)]
pub struct AppState {
    stub: Arc<dyn ResponseGenerator>,
    remote: Arc<dyn ResponseGenerator>,
    interaction_log: Arc<InteractionLog>,
}

impl AppState {
    pub fn new(
        stub: Arc<dyn ResponseGenerator>,
        remote: Arc<dyn ResponseGenerator>,
        interaction_log: Arc<InteractionLog>,
    ) -> Self {
        Self {
            stub,
            remote,
            interaction_log,
        }
    }
}

/// Gateway error mapped to an HTTP response / 映射为HTTP响应的网关错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidPrompt(#[from] PromptError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn build_router(state: AppState, cors_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/generate", post(generate))
        .route("/generate-llama", post(generate_llama))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

impl HttpGateway {
    /// Create new HTTP gateway / 创建新的HTTP网关
    pub fn new(config: Arc<VaultConfig>, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start HTTP gateway with shutdown signal / 使用关闭信号启动HTTP网关
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let (listener, app) = self.prepare().await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    async fn prepare(self) -> anyhow::Result<(tokio::net::TcpListener, Router)> {
        let addr: SocketAddr = self.config.http.server.addr;
        info!("Starting HTTP gateway on {}", addr);

        let app = build_router(self.state, self.config.http.cors_enabled);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP gateway listening on {}", listener.local_addr()?);

        Ok((listener, app))
    }
}

/// Root endpoint / 根端点
/// GET /
async fn root() -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        (
            "generate".to_string(),
            "POST /generate - Generate response for prompt".to_string(),
        ),
        (
            "generate-llama".to_string(),
            "POST /generate-llama - Generate response with the local Ollama model".to_string(),
        ),
        (
            "health".to_string(),
            "GET /health - Check API health".to_string(),
        ),
    ]);
    Json(ServiceInfo {
        message: "MiniVault API is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Health check endpoint / 健康检查端点
/// GET /health
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Stub generation endpoint / 模板生成端点
/// POST /generate
async fn generate(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let generator = state.stub.clone();
    dispatch(&state, generator.as_ref(), "/generate", body).await
}

/// Remote model generation endpoint / 远程模型生成端点
/// POST /generate-llama
async fn generate_llama(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let generator = state.remote.clone();
    dispatch(&state, generator.as_ref(), "/generate-llama", body).await
}

/// Validate, generate, then log. Nothing is logged unless generation succeeded.
async fn dispatch(
    state: &AppState,
    generator: &dyn ResponseGenerator,
    route: &'static str,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id, route, model = generator.model());

    async move {
        let Json(req) = body?;
        let prompt = validate_prompt(&req.prompt).map_err(|e| {
            info!(error = %e, "rejected prompt");
            e
        })?;

        let response = generator.generate(prompt).await.map_err(|e| {
            warn!(error = %e, "generation failed");
            e
        })?;

        state
            .interaction_log
            .record(prompt, &response, generator.model())
            .await;
        info!(prompt_chars = prompt.chars().count(), "generation completed");

        Ok::<_, ApiError>(Json(GenerateResponse { response }))
    }
    .instrument(span)
    .await
}
