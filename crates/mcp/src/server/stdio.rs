//! MCP over stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

use crate::server::core::{BstackMcpCore, ResolutionServices};

/// Serves the tools on stdio until the client disconnects.
///
/// Stdout carries protocol frames only; logging must go to stderr.
pub async fn serve_stdio(services: Arc<ResolutionServices>) -> Result<()> {
    info!("serving MCP on stdio");
    let service = BstackMcpCore::new(services)
        .serve(stdio())
        .await
        .context("failed to start MCP stdio service")?;
    service.waiting().await.context("MCP stdio service terminated abnormally")?;
    info!("MCP stdio client disconnected");
    Ok(())
}
