//! LoRA Keywords - Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lora_keywords::{
    KeywordResolver, PromptBuffer, api, config::KeywordsConfig, list_lora_files, metrics,
    presenter::{StdoutPresenter, insert_keywords, resolve_and_present},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "lora-keywords")]
#[command(about = "Trained-word lookup for local LoRA files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the LoRA directory
    #[arg(long)]
    lora_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the lookup API
    Serve {
        /// Override API port
        #[arg(long)]
        port: Option<u16>,
    },
    /// List selectable LoRA files
    List,
    /// Resolve keywords for one or more LoRA files
    Resolve {
        /// Paths relative to the LoRA directory
        #[arg(required = true)]
        files: Vec<String>,

        /// Append resolved keywords to this prompt and print it
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for command output
    match cli.log_format.as_str() {
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
    }

    // Load configuration
    let mut config = KeywordsConfig::load(cli.config)?;

    // CLI overrides
    if let Some(dir) = cli.lora_dir {
        config.lora_dir = dir;
    }
    if let Command::Serve { port: Some(port) } = cli.command {
        config.api_port = port;
    }

    config.validate()?;

    tracing::debug!(
        lora_dir = ?config.lora_dir,
        cache_dir = ?config.cache_dir,
        registry_url = %config.registry_url,
        "Configuration loaded"
    );

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::List => {
            let files = list_lora_files(&config.lora_dir, &config.extensions, config.recursive)?;
            for file in files {
                println!("{}", file);
            }
            Ok(())
        }
        Command::Resolve { files, prompt } => resolve(config, files, prompt).await,
    }
}

async fn resolve(config: KeywordsConfig, files: Vec<String>, prompt: Option<String>) -> Result<()> {
    let resolver = KeywordResolver::from_config(&config)?;
    let presenter = StdoutPresenter;

    let results = futures::future::join_all(
        files
            .iter()
            .map(|file| resolve_and_present(&resolver, file, &presenter)),
    )
    .await;

    if let Some(prompt) = prompt {
        let buffer = PromptBuffer::new(prompt);
        for result in &results {
            insert_keywords(result, &buffer);
        }
        println!("{}", buffer.text());
    }

    Ok(())
}

async fn serve(config: KeywordsConfig) -> Result<()> {
    tracing::info!("Starting LoRA Keywords");

    // Setup metrics
    let prometheus_handle = metrics::setup_metrics()?;

    let resolver = Arc::new(KeywordResolver::from_config(&config)?);

    let app_state = api::AppState {
        resolver,
        config: Arc::new(config.clone()),
        prometheus_handle,
    };

    let app = api::create_router(app_state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind API server")?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
