//! Domain types shared across the scorer.
//!
//! Field names on the wire are camelCase to match the request/response
//! contract of the HTTP service (`tradeDate`, `annualROI`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_calendar_date;

// ── Inputs ────────────────────────────────────────────────────────────

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Put,
    Call,
}

/// A single short-option trade candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub trade_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub expiration_date: NaiveDate,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    /// Bid per share; one contract covers 100 shares.
    pub bid: f64,
    pub beta: f64,
    pub delta: f64,
    /// Only meaningful for puts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_level: Option<f64>,
}

/// Caller risk tolerances. An unset field is left out of scoring entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    #[serde(rename = "maxDTE", default, skip_serializing_if = "Option::is_none")]
    pub max_dte: Option<f64>,

    /// Minimum annualized ROI as a decimal fraction (0.20 = 20%).
    #[serde(rename = "minROI", default, skip_serializing_if = "Option::is_none")]
    pub min_roi: Option<f64>,

    #[serde(rename = "maxBeta", default, skip_serializing_if = "Option::is_none")]
    pub max_beta: Option<f64>,

    /// Decimal fraction (0.30 = 30 delta).
    #[serde(rename = "maxDelta", default, skip_serializing_if = "Option::is_none")]
    pub max_delta: Option<f64>,
}

impl Tolerances {
    pub fn is_empty(&self) -> bool {
        self.max_dte.is_none()
            && self.min_roi.is_none()
            && self.max_beta.is_none()
            && self.max_delta.is_none()
    }
}

// ── Outputs ───────────────────────────────────────────────────────────

/// Suitability bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suggestion {
    Conservative,
    Neutral,
    Aggressive,
}

impl Suggestion {
    pub fn as_str(self) -> &'static str {
        match self {
            Suggestion::Conservative => "Conservative",
            Suggestion::Neutral => "Neutral",
            Suggestion::Aggressive => "Aggressive",
        }
    }
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub key: String,
    pub label: String,
    pub max: f64,
    pub earned: f64,
    pub note: String,
}

/// A trade with its derived metrics, scoring ledger, and bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedTrade {
    #[serde(flatten)]
    pub trade: Trade,
    pub dte: i64,
    pub premium: f64,
    pub breakeven: f64,
    #[serde(rename = "annualROI")]
    pub annual_roi: f64,
    pub collateral_at_risk: f64,
    /// `None` when not applicable (calls, no support level, zero strike).
    pub support_variance_pct: Option<f64>,
    pub hard_fail: bool,
    pub breakdown: Vec<ScoreComponent>,
    pub total_possible: f64,
    pub points_before_penalties: f64,
    pub penalties_applied: f64,
    pub points_final: f64,
    pub score: f64,
    pub suggestion: Suggestion,
}

/// A batch slot that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedTrade {
    /// Position of the trade in the request.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub error: String,
}

/// Result for one slot of a batch; order and length always match the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TradeOutcome {
    Evaluated(Box<EvaluatedTrade>),
    Rejected(RejectedTrade),
}

impl TradeOutcome {
    pub fn evaluated(&self) -> Option<&EvaluatedTrade> {
        match self {
            TradeOutcome::Evaluated(trade) => Some(trade),
            TradeOutcome::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, TradeOutcome::Rejected(_))
    }
}
