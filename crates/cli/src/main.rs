use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use bstack_mcp::{McpHttpServer, ResolutionServices, ServerConfig, load_config, load_config_from_path, resolve_bind_address, serve_stdio};
use bstack_types::{DeviceEntry, ResolutionError};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

/// Resolve loose test-cloud descriptors to concrete, supported values.
#[derive(Debug, Parser)]
#[command(name = "bstack", version, about)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pick an OS version from the versions a target publishes.
    Version {
        /// Requested version, `latest` or `oldest`.
        requested: String,
        /// Available versions in catalog order.
        #[arg(required = true)]
        available: Vec<String>,
    },
    /// Find one device by loose name.
    Device {
        name: String,
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        os_version: Option<String>,
        /// JSON file with device entries; the published catalog is fetched when omitted.
        #[arg(long, value_name = "FILE")]
        devices: Option<PathBuf>,
    },
    /// Resolve the regional API endpoint for the configured account.
    Endpoint {
        #[arg(long)]
        refresh: bool,
    },
    /// Print numbered setup steps for a project.
    Setup {
        #[arg(long)]
        language: String,
        #[arg(long)]
        framework: String,
        #[arg(long)]
        test_framework: String,
        /// disabled, with-sdk or web.
        #[arg(long)]
        percy_mode: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Serve the MCP tools on stdio, or on loopback HTTP with `--http`.
    Serve {
        /// Bind address; defaults to `httpBindAddress` from the config file.
        #[arg(long, value_name = "ADDR", num_args = 0..=1)]
        http: Option<Option<String>>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
    .context("failed to load configuration")?;
    let services = Arc::new(ResolutionServices::from_config(&config)?);

    match cli.command {
        Command::Version { requested, available } => print_json(&services.resolve_version(&requested, &available)),
        Command::Device {
            name,
            platform,
            os_version,
            devices,
        } => {
            let inline = devices.as_deref().map(read_devices).transpose()?;
            let result = services
                .find_device(&name, platform.as_deref(), os_version.as_deref(), inline)
                .await;
            report(result)
        }
        Command::Endpoint { refresh } => report(services.resolve_endpoint(refresh).await),
        Command::Setup {
            language,
            framework,
            test_framework,
            percy_mode,
            project,
        } => {
            let result = services
                .setup_instructions(&language, &framework, &test_framework, percy_mode.as_deref(), project.as_deref())
                .await;
            report(result)
        }
        Command::Serve { http: None } => {
            serve_stdio(services).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { http: Some(address) } => {
            serve_http(&config, address.as_deref(), services).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout stays free for JSON output and MCP frames.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve_http(config: &ServerConfig, address: Option<&str>, services: Arc<ResolutionServices>) -> Result<()> {
    let bind_address = resolve_bind_address(Some(address.unwrap_or(&config.http_bind_address)))?;
    let running = McpHttpServer::new(bind_address, services).start().await?;
    info!(address = %running.bound_address(), "press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    running.stop().await
}

fn read_devices(path: &Path) -> Result<Vec<DeviceEntry>> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a JSON array of devices", path.display()))
}

fn report<T: Serialize>(result: Result<T, ResolutionError>) -> Result<ExitCode> {
    match result {
        Ok(value) => print_json(&value),
        Err(error) => {
            eprintln!("{}", serde_json::to_string_pretty(&error.details())?);
            Ok(ExitCode::from(2))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}
