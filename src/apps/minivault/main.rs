//! MiniVault main entry point
//! MiniVault 主入口点

use anyhow::Context;
use clap::Parser;
use minivault::config::init_tracing;
use minivault::vault::{
    AppState, CliArgs, HttpGateway, InteractionLog, OllamaChatGenerator, StubGenerator,
    VaultConfig,
};

use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let log_args = format!("{:?}", args);

    let config = VaultConfig::load_with_cli(&args)?;

    init_tracing(&config.logging.to_logging_config())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(log_args, config))
}

async fn run(log_args: String, config: VaultConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);

    tracing::info!("Starting MiniVault with args: {}", log_args);

    let interaction_log = Arc::new(InteractionLog::new(config.interaction_log.path()));
    interaction_log
        .ensure_dir()
        .await
        .with_context(|| format!("create {}", interaction_log.path().display()))?;

    let stub = Arc::new(StubGenerator::new());
    let remote = Arc::new(
        OllamaChatGenerator::new(&config.ollama).context("build Ollama client")?,
    );

    tracing::info!("MiniVault starting with:");
    tracing::info!("  - HTTP gateway on: {}", config.http.server.addr);
    tracing::info!("  - Ollama at: {} (model {})", config.ollama.base_url, config.ollama.model);
    tracing::info!("  - Interaction log: {}", interaction_log.path().display());
    tracing::info!("  - CORS enabled: {}", config.http.cors_enabled);

    let state = AppState::new(stub, remote, interaction_log);
    let http_gateway = HttpGateway::new(config.clone(), state);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut http_handle = tokio::spawn(async move {
        http_gateway
            .start_with_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let exited_early = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            false
        }
        // gateway stopped on its own, e.g. the bind failed
        res = &mut http_handle => {
            res??;
            true
        }
    };

    if !exited_early {
        tracing::info!("MiniVault shutting down");
        let _ = shutdown_tx.send(());
        if let Err(e) = http_handle.await? {
            tracing::error!("HTTP gateway error: {}", e);
        }
    }

    tracing::info!("MiniVault shutdown complete");
    Ok(())
}
