//! Shared configuration pieces and operator logging setup
//! 通用配置与运维日志初始化
//!
//! Service-level configuration (layering of defaults, TOML file, environment
//! and CLI flags) lives in [`crate::vault::config`]; this module holds the
//! building blocks it is made of and the tracing bootstrap.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{time::uptime, MakeWriter},
    layer::{Layered, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub mod base;
pub use base::*;

/// Common logging configuration / 通用日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive / 日志级别
    pub level: String,
    /// Log format (json, compact, pretty) / 日志格式
    pub format: String,
    /// Mirror operator logs into this file / 日志文件路径
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

static FILE_LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

fn fmt_layer<S, W>(format: &str, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(uptime())
        .with_level(true)
        .with_writer(writer);
    match format {
        "json" => layer.json().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.pretty().boxed(),
    }
}

/// Initialize tracing based on logging configuration
/// 基于日志配置初始化跟踪
///
/// `RUST_LOG` takes precedence over the configured level. When a file path
/// is set, events are mirrored into it through a non-blocking writer; pretty
/// output is only used on stdout, the file gets compact lines instead.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.level.trim().is_empty() {
            EnvFilter::new("info")
        } else {
            EnvFilter::new(config.level.clone())
        }
    });

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(&config.format, std::io::stdout)];

    if let Some(path) = config.file_path.as_ref() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log dir: {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);
        let _ = FILE_LOG_GUARD.set(guard);
        let file_format = if config.format == "json" {
            "json"
        } else {
            "compact"
        };
        layers.push(fmt_layer(file_format, file_writer));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("install tracing subscriber")?;

    Ok(())
}
