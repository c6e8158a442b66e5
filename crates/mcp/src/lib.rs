//! Model Context Protocol surface for the bstack resolution engine.
//!
//! Exposes `resolve_version`, `find_device`, `resolve_endpoint` and
//! `setup_instructions` as MCP tools over stdio or a loopback streamable-HTTP
//! host, and loads the server configuration file those tools run with.

pub mod config;
pub mod server;

pub use config::{ConfigError, ServerConfig, load_config, load_config_from_path};
pub use server::{BstackMcpCore, McpHttpServer, ResolutionServices, RunningMcpHttpServer, resolve_bind_address, serve_stdio};
