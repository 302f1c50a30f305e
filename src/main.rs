//! Trade Scorer entry point.
//!
//! Serves the suitability evaluator over HTTP, or scores a request file
//! offline with `--evaluate`.

mod config;
mod server;

use std::path::{Path, PathBuf};

use clap::Parser;
use suitability::TradeEvaluator;
use tracing::{error, info, warn};

use crate::config::load_config;
use crate::server::EvaluateRequest;

#[derive(Parser)]
#[command(name = "trade-scorer", version, about = "Options trade suitability scorer")]
struct Cli {
    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Load and validate configuration, then exit.
    #[arg(long)]
    check_config: bool,

    /// Score a request file (`{"tolerances": ..., "trades": [...]}`) and print the outcomes.
    #[arg(long, value_name = "PATH")]
    evaluate: Option<PathBuf>,
}

fn evaluate_file(evaluator: &TradeEvaluator, path: &Path) -> common::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    let request: EvaluateRequest = serde_json::from_str(&contents)?;
    let tolerances = request.tolerances.unwrap_or_default();
    let trades = request.trades.unwrap_or_default();
    let outcomes = evaluator.evaluate_json(&tolerances, &trades)?;
    Ok(serde_json::to_string_pretty(&outcomes)?)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_scorer=info,suitability=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = match load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(host) = cli.host {
        cfg.server.host = host;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    if cli.check_config {
        info!("✅ Configuration OK");
        info!(
            "Server: {}:{} max_body_bytes={} origins={:?}",
            cfg.server.host, cfg.server.port, cfg.server.max_body_bytes, cfg.server.allowed_origins
        );
        info!(
            "Scoring: hard_fail={} min_roi={} falloff={:?} penalty_cap={}",
            cfg.scoring.hard_fail_enabled,
            cfg.scoring.hard_fail_min_roi,
            cfg.scoring.falloff,
            cfg.scoring.penalty_cap
        );
        return;
    }

    let evaluator = TradeEvaluator::new(cfg.scoring.clone());

    if let Some(path) = cli.evaluate {
        match evaluate_file(&evaluator, &path) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                error!("Failed to evaluate {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    info!("🚀 Trade Scorer starting...");
    if !cfg.scoring.hard_fail_enabled {
        warn!("ROI hard fail disabled: low-yield trades will be scored, not rejected");
    }

    if let Err(e) = server::serve(&cfg.server, evaluator).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
