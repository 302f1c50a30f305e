//! Scoring criteria.
//!
//! Each criterion is gated on its tolerance (or on the metric being
//! applicable) and yields at most one [`Component`]. A component records the
//! finding that produced it so notes can be rendered later without
//! re-deriving anything.

use common::{Tolerances, Trade};

use crate::config::ScoringPolicy;
use crate::metrics::TradeMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKey {
    RoiHardFail,
    Roi,
    Delta,
    Dte,
    Beta,
    Collateral,
    Support,
}

impl CriterionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CriterionKey::RoiHardFail => "roi-hard-fail",
            CriterionKey::Roi => "roi",
            CriterionKey::Delta => "delta",
            CriterionKey::Dte => "dte",
            CriterionKey::Beta => "beta",
            CriterionKey::Collateral => "collateral",
            CriterionKey::Support => "support-variance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CriterionKey::RoiHardFail => "Annual ROI (minimum)",
            CriterionKey::Roi => "Annual ROI",
            CriterionKey::Delta => "Delta",
            CriterionKey::Dte => "Days to expiration",
            CriterionKey::Beta => "Beta",
            CriterionKey::Collateral => "Collateral at risk",
            CriterionKey::Support => "Support variance",
        }
    }
}

/// Tier of a tiered criterion, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Favorable,
    Moderate,
    Unfavorable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Finding {
    HardFail { annual_roi: f64, threshold: f64 },
    Roi { annual_roi: f64, min_roi: f64 },
    Limit { value: f64, tolerance: f64 },
    Collateral { amount: f64, tier: Tier },
    Support { variance_pct: f64, tier: Tier },
}

/// One scored criterion, full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub key: CriterionKey,
    pub max: f64,
    pub earned: f64,
    pub finding: Finding,
}

impl Component {
    /// `value / tolerance` for a limit criterion that was exceeded.
    pub fn over_ratio(&self) -> Option<f64> {
        match self.finding {
            Finding::Limit { value, tolerance } if value > tolerance && tolerance > 0.0 => {
                Some(value / tolerance)
            }
            _ => None,
        }
    }
}

/// Keep `earned` inside `[0, max]` without panicking on odd policies.
fn bounded(earned: f64, max: f64) -> f64 {
    earned.max(0.0).min(max.max(0.0))
}

fn positive(limit: Option<f64>) -> Option<f64> {
    limit.filter(|t| *t > 0.0)
}

/// ROI minimum check. Returns the lone breakdown entry when the trade fails.
pub fn hard_fail(
    policy: &ScoringPolicy,
    tolerances: &Tolerances,
    metrics: &TradeMetrics,
) -> Option<Component> {
    if !policy.hard_fail_enabled {
        return None;
    }
    let threshold = tolerances.min_roi.unwrap_or(policy.hard_fail_min_roi);
    if metrics.annual_roi < threshold {
        Some(Component {
            key: CriterionKey::RoiHardFail,
            max: policy.weights.roi,
            earned: 0.0,
            finding: Finding::HardFail {
                annual_roi: metrics.annual_roi,
                threshold,
            },
        })
    } else {
        None
    }
}

fn roi(policy: &ScoringPolicy, tolerances: &Tolerances, metrics: &TradeMetrics) -> Option<Component> {
    let min_roi = tolerances.min_roi?;
    let weight = policy.weights.roi;
    let earned = if metrics.annual_roi >= min_roi {
        weight
    } else if min_roi > 0.0 {
        (metrics.annual_roi / min_roi) * weight
    } else {
        0.0
    };
    Some(Component {
        key: CriterionKey::Roi,
        max: weight,
        earned: bounded(earned, weight),
        finding: Finding::Roi {
            annual_roi: metrics.annual_roi,
            min_roi,
        },
    })
}

fn limit(
    policy: &ScoringPolicy,
    key: CriterionKey,
    weight: f64,
    value: f64,
    tolerance: Option<f64>,
) -> Option<Component> {
    let tolerance = positive(tolerance)?;
    let earned = weight * policy.falloff.credit(value, tolerance);
    Some(Component {
        key,
        max: weight,
        earned: bounded(earned, weight),
        finding: Finding::Limit { value, tolerance },
    })
}

fn collateral(policy: &ScoringPolicy, metrics: &TradeMetrics) -> Component {
    let tiers = &policy.collateral;
    let amount = metrics.collateral_at_risk;
    let (tier, credit) = if amount < tiers.low_below {
        (Tier::Favorable, 1.0)
    } else if amount <= tiers.high_above {
        (Tier::Moderate, tiers.moderate_credit)
    } else {
        (Tier::Unfavorable, tiers.high_credit)
    };
    let weight = policy.weights.collateral;
    Component {
        key: CriterionKey::Collateral,
        max: weight,
        earned: bounded(weight * credit, weight),
        finding: Finding::Collateral { amount, tier },
    }
}

fn support(policy: &ScoringPolicy, metrics: &TradeMetrics) -> Option<Component> {
    let variance_pct = metrics.support_variance_pct?;
    let tiers = &policy.support;
    let (tier, credit) = if variance_pct >= tiers.strong_at {
        (Tier::Favorable, 1.0)
    } else if variance_pct >= tiers.moderate_at {
        (Tier::Moderate, tiers.moderate_credit)
    } else {
        (Tier::Unfavorable, tiers.weak_credit)
    };
    let weight = policy.weights.support;
    Some(Component {
        key: CriterionKey::Support,
        max: weight,
        earned: bounded(weight * credit, weight),
        finding: Finding::Support { variance_pct, tier },
    })
}

/// Score every applicable criterion, in breakdown order: ROI, delta, DTE,
/// beta, collateral, support.
pub fn score_criteria(
    policy: &ScoringPolicy,
    tolerances: &Tolerances,
    trade: &Trade,
    metrics: &TradeMetrics,
) -> Vec<Component> {
    let weights = &policy.weights;
    [
        roi(policy, tolerances, metrics),
        limit(
            policy,
            CriterionKey::Delta,
            weights.delta,
            trade.delta,
            tolerances.max_delta,
        ),
        limit(
            policy,
            CriterionKey::Dte,
            weights.dte,
            metrics.dte as f64,
            tolerances.max_dte,
        ),
        limit(
            policy,
            CriterionKey::Beta,
            weights.beta,
            trade.beta,
            tolerances.max_beta,
        ),
        Some(collateral(policy, metrics)),
        support(policy, metrics),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::OptionType;

    fn make_trade(strike: f64, bid: f64, delta: f64, beta: f64) -> Trade {
        Trade {
            symbol: "TEST".into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            option_type: OptionType::Put,
            strike,
            bid,
            beta,
            delta,
            support_level: None,
        }
    }

    fn components(tolerances: Tolerances, trade: &Trade) -> Vec<Component> {
        let policy = ScoringPolicy::default();
        let metrics = TradeMetrics::derive(trade).unwrap();
        score_criteria(&policy, &tolerances, trade, &metrics)
    }

    fn find(components: &[Component], key: CriterionKey) -> Component {
        *components
            .iter()
            .find(|c| c.key == key)
            .unwrap_or_else(|| panic!("missing component {:?}", key))
    }

    #[test]
    fn test_unset_tolerances_only_score_collateral() {
        let trade = make_trade(150.0, 2.0, 0.9, 3.0);
        let comps = components(Tolerances::default(), &trade);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].key, CriterionKey::Collateral);
    }

    #[test]
    fn test_partial_delta_credit() {
        let trade = make_trade(150.0, 2.0, 0.6, 1.0);
        let tolerances = Tolerances {
            max_delta: Some(0.3),
            ..Default::default()
        };
        let delta = find(&components(tolerances, &trade), CriterionKey::Delta);
        assert_eq!(delta.max, 25.0);
        assert!((delta.earned - 6.25).abs() < 1e-9, "earned={}", delta.earned);
        assert!((delta.over_ratio().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_tolerance_is_not_scored() {
        let trade = make_trade(150.0, 2.0, 0.6, 1.0);
        let tolerances = Tolerances {
            max_delta: Some(0.0),
            max_beta: Some(-1.0),
            max_dte: Some(0.0),
            ..Default::default()
        };
        let comps = components(tolerances, &trade);
        assert_eq!(comps.len(), 1, "only collateral expected: {:?}", comps);
    }

    #[test]
    fn test_roi_partial_credit() {
        // annual ROI = 0.365 against a 0.73 target -> half credit.
        let trade = make_trade(100.0, 1.0, 0.2, 1.0);
        let tolerances = Tolerances {
            min_roi: Some(0.73),
            ..Default::default()
        };
        let roi = find(&components(tolerances, &trade), CriterionKey::Roi);
        assert!((roi.earned - 17.5).abs() < 1e-9, "earned={}", roi.earned);
        assert_eq!(roi.over_ratio(), None);
    }

    #[test]
    fn test_collateral_tiers() {
        let cases = [
            (150.0, 10.0, Tier::Favorable),
            (200.0, 5.0, Tier::Moderate),
            (350.0, 5.0, Tier::Moderate),
            (500.0, 5.0, Tier::Moderate),
            (600.0, 2.0, Tier::Unfavorable),
        ];
        for (strike, expected, expected_tier) in cases {
            let trade = make_trade(strike, 2.0, 0.2, 1.0);
            let comp = find(&components(Tolerances::default(), &trade), CriterionKey::Collateral);
            assert!(
                (comp.earned - expected).abs() < 1e-9,
                "strike {} earned {}",
                strike,
                comp.earned
            );
            match comp.finding {
                Finding::Collateral { tier, .. } => assert_eq!(tier, expected_tier),
                other => panic!("unexpected finding {:?}", other),
            }
        }
    }

    #[test]
    fn test_support_tiers() {
        let cases = [(115.0, 10.0), (110.0, 10.0), (107.0, 5.0), (104.0, 2.0), (90.0, 2.0)];
        for (support_level, expected) in cases {
            let mut trade = make_trade(100.0, 2.0, 0.2, 1.0);
            trade.support_level = Some(support_level);
            let comp = find(&components(Tolerances::default(), &trade), CriterionKey::Support);
            assert!(
                (comp.earned - expected).abs() < 1e-9,
                "support {} earned {}",
                support_level,
                comp.earned
            );
        }
    }

    #[test]
    fn test_breakdown_order() {
        let mut trade = make_trade(100.0, 2.0, 0.2, 1.0);
        trade.support_level = Some(110.0);
        let tolerances = Tolerances {
            max_dte: Some(30.0),
            min_roi: Some(0.2),
            max_beta: Some(1.5),
            max_delta: Some(0.3),
        };
        let keys: Vec<CriterionKey> = components(tolerances, &trade)
            .iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                CriterionKey::Roi,
                CriterionKey::Delta,
                CriterionKey::Dte,
                CriterionKey::Beta,
                CriterionKey::Collateral,
                CriterionKey::Support,
            ]
        );
    }

    #[test]
    fn test_hard_fail_uses_min_roi_then_default() {
        let policy = ScoringPolicy::default();
        let trade = make_trade(100.0, 1.0, 0.2, 1.0);
        let metrics = TradeMetrics::derive(&trade).unwrap();

        // 0.365 clears the 0.30 default.
        assert!(hard_fail(&policy, &Tolerances::default(), &metrics).is_none());

        let strict = Tolerances {
            min_roi: Some(0.5),
            ..Default::default()
        };
        let failed = hard_fail(&policy, &strict, &metrics).unwrap();
        assert_eq!(failed.key, CriterionKey::RoiHardFail);
        assert_eq!(failed.max, 35.0);
        assert_eq!(failed.earned, 0.0);

        assert!(hard_fail(&ScoringPolicy::proportional(), &strict, &metrics).is_none());
    }
}
