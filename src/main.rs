use anyhow::Context;
use rmcp::{ServiceExt, transport::stdio};
use std::path::Path;
use suggest_mcp::config::EngineConfig;
use suggest_mcp::engine::SuggestionEngine;
use suggest_mcp::server::{SuggestServer, expand_tilde};
use suggest_mcp::{catalog, error::Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let default_level = if cfg!(debug_assertions) {
        "suggest_mcp=debug,warn"
    } else {
        "suggest_mcp=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries the MCP stdio transport.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(filter)
        .init();

    let tools = match std::env::args().nth(1) {
        Some(path) => {
            let path = expand_tilde(&path);
            catalog::load_tools(Path::new(path.as_ref()))
                .with_context(|| format!("loading catalog from {path}"))?
        }
        None => {
            tracing::info!("no catalog path given; using the built-in sample catalog");
            catalog::sample_tools()
        }
    };

    let engine = SuggestionEngine::new(tools, EngineConfig::default())?;
    let server = SuggestServer::new(engine);

    tracing::info!("starting MCP stdio server");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
