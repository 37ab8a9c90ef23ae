//! MiniVault configuration / MiniVault配置

use anyhow::{bail, Context, Result};
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::base::{LogConfig, ServerConfig};

/// Default configuration file looked up in the working directory
/// 工作目录下的默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "minivault.toml";

/// Environment variable prefix / 环境变量前缀
pub const ENV_PREFIX: &str = "MINIVAULT_";

/// MiniVault command line arguments / MiniVault命令行参数
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "minivault",
    version,
    about = "MiniVault - local prompt gateway with interaction logging\nMiniVault - 带交互日志的本地提示词网关"
)]
pub struct CliArgs {
    /// Configuration file path / 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path / 配置文件路径"
    )]
    pub config: Option<String>,

    /// HTTP listen address / HTTP监听地址
    #[arg(
        long,
        value_name = "ADDR",
        help = "HTTP listen address (e.g., 0.0.0.0:8000) / HTTP监听地址"
    )]
    pub http_addr: Option<String>,

    /// Log level / 日志级别
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level (trace, debug, info, warn, error) / 日志级别"
    )]
    pub log_level: Option<String>,

    #[arg(long, value_name = "FORMAT", help = "Log format (pretty, compact, json) / 日志格式")]
    pub log_format: Option<String>,

    /// Interaction log directory / 交互日志目录
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,

    /// Ollama base URL / Ollama基础地址
    #[arg(long, value_name = "URL")]
    pub ollama_url: Option<String>,

    #[arg(long, value_name = "MODEL")]
    pub ollama_model: Option<String>,

    #[arg(long, value_name = "MS")]
    pub ollama_timeout_ms: Option<u64>,

    /// Enable permissive CORS / 启用CORS
    #[arg(long, value_name = "BOOL")]
    pub cors: Option<bool>,
}

/// MiniVault service configuration / MiniVault服务配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VaultConfig {
    /// HTTP gateway configuration / HTTP网关配置
    pub http: HttpConfig,
    /// Operator logging configuration / 运维日志配置
    pub logging: LogConfig,
    /// Interaction log location / 交互日志位置
    pub interaction_log: InteractionLogConfig,
    /// Remote model backend / 远程模型后端
    pub ollama: OllamaConfig,
}

/// HTTP gateway configuration / HTTP网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP server settings / HTTP服务器设置
    pub server: ServerConfig,
    /// Enable CORS / 启用CORS
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionLogConfig {
    pub dir: String,
    pub file_name: String,
}

impl Default for InteractionLogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_name: "log.jsonl".to_string(),
        }
    }
}

impl InteractionLogConfig {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.file_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    /// Whole-request timeout / 整体请求超时（毫秒）
    pub timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "phi3:mini".to_string(),
            system_prompt: "You are a helpful AI assistant called MiniVault, designed to give clear and concise answers.".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl VaultConfig {
    /// Load configuration with CLI arguments / 使用CLI参数加载配置
    ///
    /// Precedence order (highest to lowest):
    /// 优先级顺序（从高到低）：
    /// 1. Command line arguments / 命令行参数
    /// 2. Environment variables (`MINIVAULT_`, `__` nests) / 环境变量
    /// 3. Configuration file / 配置文件
    /// 4. Default values / 默认值
    pub fn load_with_cli(args: &CliArgs) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(VaultConfig::default()));

        // An explicit path must exist; the default file is optional
        // 显式指定的配置文件必须存在；默认文件可选
        figment = match &args.config {
            Some(path) => {
                if !std::path::Path::new(path).exists() {
                    bail!("config file not found: {}", path);
                }
                figment.merge(Toml::file(path))
            }
            None => figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        };

        let mut config: VaultConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to load configuration")?;

        config.apply_cli(args)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(addr) = &args.http_addr {
            self.http.server.addr = addr
                .parse()
                .with_context(|| format!("invalid --http-addr: {}", addr))?;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = format.clone();
        }
        if let Some(dir) = &args.log_dir {
            self.interaction_log.dir = dir.clone();
        }
        if let Some(url) = &args.ollama_url {
            self.ollama.base_url = url.clone();
        }
        if let Some(model) = &args.ollama_model {
            self.ollama.model = model.clone();
        }
        if let Some(t) = args.ollama_timeout_ms {
            self.ollama.timeout_ms = t;
        }
        if let Some(cors) = args.cors {
            self.http.cors_enabled = cors;
        }
        Ok(())
    }

    /// Validate the configuration / 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.ollama.model.trim().is_empty() {
            bail!("ollama.model must not be empty");
        }
        let url = self.ollama.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("ollama.base_url must be an http(s) URL: {}", url);
        }
        if self.ollama.timeout_ms == 0 {
            bail!("ollama.timeout_ms must be greater than zero");
        }
        if self.interaction_log.file_name.trim().is_empty() {
            bail!("interaction_log.file_name must not be empty");
        }
        Ok(())
    }
}
