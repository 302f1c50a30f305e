//! Suitability scoring crate.
//!
//! Scores short-option trade candidates against caller risk tolerances:
//! derived metrics, an optional ROI hard fail, weighted criteria, a penalty
//! pool for exceeded limits, and a 0-100 score with a bucket label.

pub mod classify;
pub mod config;
pub mod criteria;
pub mod evaluator;
pub mod metrics;
pub mod penalty;
pub mod report;

pub use config::{Falloff, PolicyPreset, ScoringPolicy};
pub use criteria::{Component, CriterionKey, Finding};
pub use evaluator::{Evaluation, Ledger, TradeEvaluator};
pub use metrics::TradeMetrics;
