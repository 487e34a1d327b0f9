use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use query_time_mcp::config::{Config, ServerMode};
use query_time_mcp::http::serve_http;
use query_time_mcp::mcp::run_stdio;
use query_time_mcp::service::TimeService;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout 留给 JSON-RPC，日志走 stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config.yaml|json>", args[0]);
        std::process::exit(1);
    }

    let cfg_path = Path::new(&args[1]);
    let config = Config::load_from_path(cfg_path)
        .with_context(|| format!("loading config {}", cfg_path.display()))?;
    info!(mode = ?config.server.mode, "config loaded");

    let service = Arc::new(TimeService::new(&config.time).context("building time parser")?);

    match config.server.mode {
        ServerMode::Http => serve_http(&config, service).await?,
        ServerMode::Stdio => run_stdio(service).await?,
        ServerMode::Both => {
            let http_service = service.clone();
            let http_config = config.clone();
            let http_task = tokio::spawn(async move { serve_http(&http_config, http_service).await });
            let stdio_task = tokio::spawn(async move { run_stdio(service).await });
            http_task.await.context("http task panicked")??;
            stdio_task.await.context("stdio task panicked")??;
        }
    }

    Ok(())
}
