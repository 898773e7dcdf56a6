//! PixelBrain Server Entry Point

use clap::Parser;
use pixelbrain::cli::{Cli, Commands};
use pixelbrain::config::AppConfig;
use pixelbrain::metrics::SysinfoMetrics;
use pixelbrain::{logging, server, AppState};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Status(args)) => {
            if let Err(e) = pixelbrain::cli::status::execute(&args).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve(args)) => {
            init_logging();
            let mut config = AppConfig::from_env();
            args.apply(&mut config);
            run_server(config).await;
        }
        None => {
            // No subcommand - default to serve
            init_logging();
            run_server(AppConfig::from_env()).await;
        }
    }
}

fn init_logging() {
    if let Err(e) = logging::init() {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: AppConfig) {
    info!("PixelBrain v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let state = match AppState::new(config, Arc::new(SysinfoMetrics::new())) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(state).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
