//! Trade evaluator: runs the scoring pipeline for each trade.
//!
//! Stages, per trade:
//! 1. Derive metrics (DTE, premium, breakeven, ROI, collateral, support).
//! 2. ROI hard fail: short-circuits to a zero score.
//! 3. Score the gated criteria.
//! 4. Fold components into the ledger, including the penalty pool.
//! 5. Normalize to 0-100 and classify.
//!
//! Trades never interact; one failing trade is reported in its own slot and
//! the rest of the batch is still evaluated.

use common::{Error, RejectedTrade, Suggestion, Tolerances, Trade, TradeOutcome};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::classify::{classify, normalize};
use crate::config::ScoringPolicy;
use crate::criteria::{self, Component};
use crate::metrics::TradeMetrics;
use crate::penalty::{penalties_applied, penalty_pool};

// ── Public Types ──────────────────────────────────────────────────────

/// Point totals for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ledger {
    pub total_possible: f64,
    pub points_before_penalties: f64,
    pub penalty_pool: f64,
    pub penalties_applied: f64,
    pub points_final: f64,
}

impl Ledger {
    pub fn from_components(components: &[Component], penalty_cap: f64) -> Self {
        let (total_possible, points_before_penalties) = components
            .iter()
            .fold((0.0, 0.0), |(total, earned), c| (total + c.max, earned + c.earned));
        let pool = penalty_pool(components);
        let applied = penalties_applied(pool, penalty_cap);

        Self {
            total_possible,
            points_before_penalties,
            penalty_pool: pool,
            penalties_applied: applied,
            points_final: (points_before_penalties - applied).max(0.0),
        }
    }
}

/// Full-precision result for one trade.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub trade: Trade,
    pub metrics: TradeMetrics,
    pub hard_fail: bool,
    pub components: Vec<Component>,
    pub ledger: Ledger,
    pub score: f64,
    pub suggestion: Suggestion,
}

// ── Evaluator ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TradeEvaluator {
    policy: ScoringPolicy,
}

impl TradeEvaluator {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Evaluate a single trade at full precision.
    pub fn evaluate_trade(&self, tolerances: &Tolerances, trade: &Trade) -> Result<Evaluation, Error> {
        let metrics = TradeMetrics::derive(trade)?;

        if let Some(failed) = criteria::hard_fail(&self.policy, tolerances, &metrics) {
            debug!(
                "{}: hard fail, annual ROI {:.4} below minimum",
                trade.symbol, metrics.annual_roi
            );
            let components = vec![failed];
            let ledger = Ledger::from_components(&components, 0.0);
            return Ok(Evaluation {
                trade: trade.clone(),
                metrics,
                hard_fail: true,
                components,
                ledger,
                score: 0.0,
                suggestion: Suggestion::Aggressive,
            });
        }

        let components = criteria::score_criteria(&self.policy, tolerances, trade, &metrics);
        let ledger = Ledger::from_components(&components, self.policy.penalty_cap);
        let score = normalize(ledger.points_final, ledger.total_possible);
        let suggestion = classify(score, &self.policy.buckets);

        debug!(
            "{}: score={:.1} ({}) points={:.2}/{:.2} penalties={:.2}",
            trade.symbol,
            score,
            suggestion.as_str(),
            ledger.points_final,
            ledger.total_possible,
            ledger.penalties_applied
        );

        Ok(Evaluation {
            trade: trade.clone(),
            metrics,
            hard_fail: false,
            components,
            ledger,
            score,
            suggestion,
        })
    }

    /// Evaluate a batch of typed trades. Output order matches input order.
    pub fn evaluate(&self, tolerances: &Tolerances, trades: &[Trade]) -> Result<Vec<TradeOutcome>, Error> {
        if trades.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(trades
            .iter()
            .enumerate()
            .map(|(index, trade)| self.outcome(index, tolerances, trade))
            .collect())
    }

    /// Evaluate a batch of raw JSON trades, decoding each slot on its own so a
    /// malformed trade is rejected without affecting its neighbours.
    pub fn evaluate_json(
        &self,
        tolerances: &Tolerances,
        trades: &[serde_json::Value],
    ) -> Result<Vec<TradeOutcome>, Error> {
        if trades.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(trades
            .iter()
            .enumerate()
            .map(|(index, raw)| match Trade::deserialize(raw) {
                Ok(trade) => self.outcome(index, tolerances, &trade),
                Err(e) => {
                    let err = Error::InvalidTrade {
                        index,
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    TradeOutcome::Rejected(RejectedTrade {
                        index,
                        symbol: raw
                            .get("symbol")
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_string),
                        error: err.to_string(),
                    })
                }
            })
            .collect())
    }

    fn outcome(&self, index: usize, tolerances: &Tolerances, trade: &Trade) -> TradeOutcome {
        match self.evaluate_trade(tolerances, trade) {
            Ok(evaluation) => TradeOutcome::Evaluated(Box::new(evaluation.to_output())),
            Err(e) => {
                warn!("{}: evaluation failed: {}", trade.symbol, e);
                TradeOutcome::Rejected(RejectedTrade {
                    index,
                    symbol: Some(trade.symbol.clone()),
                    error: e.to_string(),
                })
            }
        }
    }
}
