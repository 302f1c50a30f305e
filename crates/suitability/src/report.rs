//! Output boundary: rounding and breakdown notes.
//!
//! Everything upstream works at full precision; this is the only place
//! numbers are rounded and notes are rendered.

use common::{EvaluatedTrade, ScoreComponent};

use crate::criteria::{Component, CriterionKey, Finding, Tier};
use crate::evaluator::Evaluation;

const ROI_PLACES: i32 = 4;
const SCORE_PLACES: i32 = 1;
const MONEY_PLACES: i32 = 2;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

fn short_name(key: CriterionKey) -> &'static str {
    match key {
        CriterionKey::Delta => "Delta",
        CriterionKey::Dte => "DTE",
        CriterionKey::Beta => "Beta",
        other => other.label(),
    }
}

fn format_limit_value(key: CriterionKey, value: f64) -> String {
    match key {
        CriterionKey::Dte => format!("{:.0}", value),
        _ => format!("{:.2}", value),
    }
}

/// Human-readable explanation for one component.
pub fn note(component: &Component) -> String {
    match component.finding {
        Finding::HardFail {
            annual_roi,
            threshold,
        } => format!(
            "Annual ROI {:.1}% is below the {:.1}% minimum",
            annual_roi * 100.0,
            threshold * 100.0
        ),
        Finding::Roi {
            annual_roi,
            min_roi,
        } => {
            if annual_roi >= min_roi {
                format!(
                    "Annual ROI {:.1}% meets target {:.1}%",
                    annual_roi * 100.0,
                    min_roi * 100.0
                )
            } else {
                format!(
                    "Annual ROI {:.1}% short of target {:.1}%",
                    annual_roi * 100.0,
                    min_roi * 100.0
                )
            }
        }
        Finding::Limit { value, tolerance } => {
            let name = short_name(component.key);
            let shown = format_limit_value(component.key, value);
            let max = format_limit_value(component.key, tolerance);
            match component.over_ratio() {
                Some(ratio) => format!("{} {} exceeds max {} ({:.2}x)", name, shown, max, ratio),
                None => format!("{} {} within max {}", name, shown, max),
            }
        }
        Finding::Collateral { tier, .. } => match tier {
            Tier::Favorable => "Low collateral".to_string(),
            Tier::Moderate => "Moderate collateral".to_string(),
            Tier::Unfavorable => "High collateral".to_string(),
        },
        Finding::Support { variance_pct, tier } => {
            let strength = match tier {
                Tier::Favorable => "Strong",
                Tier::Moderate => "Moderate",
                Tier::Unfavorable => "Weak",
            };
            format!("{} support cushion ({:.2}%)", strength, variance_pct)
        }
    }
}

fn to_score_component(component: &Component) -> ScoreComponent {
    ScoreComponent {
        key: component.key.as_str().to_string(),
        label: component.key.label().to_string(),
        max: round_to(component.max, MONEY_PLACES),
        earned: round_to(component.earned, MONEY_PLACES),
        note: note(component),
    }
}

impl Evaluation {
    /// Rounded wire form of this evaluation.
    pub fn to_output(&self) -> EvaluatedTrade {
        let metrics = &self.metrics;
        let ledger = &self.ledger;
        EvaluatedTrade {
            trade: self.trade.clone(),
            dte: metrics.dte,
            premium: round_to(metrics.premium, MONEY_PLACES),
            breakeven: round_to(metrics.breakeven, MONEY_PLACES),
            annual_roi: round_to(metrics.annual_roi, ROI_PLACES),
            collateral_at_risk: round_to(metrics.collateral_at_risk, MONEY_PLACES),
            support_variance_pct: metrics
                .support_variance_pct
                .map(|pct| round_to(pct, MONEY_PLACES)),
            hard_fail: self.hard_fail,
            breakdown: self.components.iter().map(to_score_component).collect(),
            total_possible: round_to(ledger.total_possible, MONEY_PLACES),
            points_before_penalties: round_to(ledger.points_before_penalties, MONEY_PLACES),
            penalties_applied: round_to(ledger.penalties_applied, MONEY_PLACES),
            points_final: round_to(ledger.points_final, MONEY_PLACES),
            score: round_to(self.score, SCORE_PLACES),
            suggestion: self.suggestion,
        }
    }
}
