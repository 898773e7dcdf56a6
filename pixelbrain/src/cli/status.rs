//! status subcommand
//!
//! Queries a running server's health and stats endpoints and prints a summary.

use clap::Args;
use pixelbrain_common::types::{HealthResponse, StatsResponse};
use reqwest::StatusCode;
use std::time::Duration;

/// Arguments for the status subcommand
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Base URL of the running server
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    pub url: String,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs) -> Result<(), anyhow::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let base = args.url.trim_end_matches('/');

    let health = client.get(format!("{}/api/health", base)).send().await;
    let health = match health {
        Ok(resp) if resp.status() == StatusCode::OK => resp.json::<HealthResponse>().await?,
        Ok(resp) => anyhow::bail!("Server at {} returned HTTP {}", base, resp.status()),
        Err(e) => anyhow::bail!("Server at {} is unreachable: {}", base, e),
    };
    println!("SERVER\t{}\t{}", base, health.message);

    let stats: StatsResponse = client
        .get(format!("{}/api/stats", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    print!("{}", format_stats(&stats));
    Ok(())
}

fn format_stats(stats: &StatsResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "SYSTEM\tCPU {:.1}%\tRAM {:.1}% ({:.2}/{:.2} GB)\n",
        stats.system.cpu,
        stats.system.ram_percent,
        stats.system.ram_used_gb,
        stats.system.ram_total_gb
    ));

    match (&stats.ollama.models, &stats.ollama.message) {
        (Some(models), _) => {
            let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            out.push_str(&format!(
                "OLLAMA\t{}\t{} model(s): {}\n",
                stats.ollama.status,
                names.len(),
                names.join(", ")
            ));
        }
        (None, Some(message)) => {
            out.push_str(&format!("OLLAMA\t{}\t{}\n", stats.ollama.status, message));
        }
        (None, None) => out.push_str(&format!("OLLAMA\t{}\n", stats.ollama.status)),
    }

    if stats.clients.is_empty() {
        out.push_str("CLIENTS\tnone\n");
    } else {
        out.push_str("CLIENT\tLAST SEEN\n");
        for client in &stats.clients {
            out.push_str(&format!("{}\t{}\n", client.ip, client.last_seen));
        }
    }
    out
}
