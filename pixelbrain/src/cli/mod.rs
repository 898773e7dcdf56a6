//! CLI module for pixelbrain
//!
//! Provides the `serve` and `status` subcommands.

pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};

/// PixelBrain - streaming control plane for a local Ollama server
#[derive(Parser, Debug)]
#[command(name = "pixelbrain")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    PIXELBRAIN_HOST                        Bind address (default: 0.0.0.0)
    PIXELBRAIN_PORT                        Listen port (default: 5000)
    PIXELBRAIN_OLLAMA_URL                  Ollama base URL (default: http://localhost:11434)
    PIXELBRAIN_CLIENT_RETENTION_SECS       Client retention window (default: 300)
    PIXELBRAIN_CLIENT_SWEEP_INTERVAL_SECS  Client sweep interval (default: 60)
    PIXELBRAIN_HEALTH_PROBE_TIMEOUT_SECS   Ollama probe timeout (default: 1)
    PIXELBRAIN_TRUST_PROXY_HEADERS         Use X-Forwarded-For for client IPs (default: false)
    PIXELBRAIN_DASHBOARD_PASSWORD          Dashboard password (unset: no gate)
    PIXELBRAIN_LOG_LEVEL                   Log level (default: info)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve(serve::ServeArgs),
    /// Query a running server
    Status(status::StatusArgs),
}
