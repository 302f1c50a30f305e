//! Unified error type for the trade scorer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No trades provided")]
    EmptyInput,

    #[error("Non-finite {metric} computed for {symbol}")]
    ComputationFault { symbol: String, metric: &'static str },

    #[error("Invalid trade at index {index}: {reason}")]
    InvalidTrade { index: usize, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
