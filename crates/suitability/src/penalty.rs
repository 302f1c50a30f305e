//! Penalty pool for exceeded limits.
//!
//! Every limit criterion (delta, DTE, beta) that overshoots its tolerance adds
//! a severity to the pool. The pool is summed, not averaged, so simultaneous
//! overshoots compound. The deduction is capped by the policy.

use crate::criteria::Component;

/// `max(0, 1 - 1/over_ratio)`: 0 at the limit, 0.5 at 2x, towards 1 beyond.
pub fn severity(over_ratio: f64) -> f64 {
    if over_ratio <= 0.0 {
        return 0.0;
    }
    (1.0 - 1.0 / over_ratio).max(0.0)
}

pub fn penalty_pool(components: &[Component]) -> f64 {
    components
        .iter()
        .filter_map(Component::over_ratio)
        .map(severity)
        .sum()
}

/// Points deducted for a pool, never more than `cap`.
pub fn penalties_applied(pool: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    (cap * pool.clamp(0.0, 1.0)).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{CriterionKey, Finding, Tier};

    fn limit(key: CriterionKey, value: f64, tolerance: f64) -> Component {
        Component {
            key,
            max: 10.0,
            earned: 0.0,
            finding: Finding::Limit { value, tolerance },
        }
    }

    #[test]
    fn test_severity_curve() {
        assert_eq!(severity(1.0), 0.0);
        assert_eq!(severity(0.5), 0.0);
        assert!((severity(1.5) - 1.0 / 3.0).abs() < 1e-12);
        assert!((severity(2.0) - 0.5).abs() < 1e-12);
        assert!((severity(3.0) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pool_sums_only_exceeded_limits() {
        let components = vec![
            limit(CriterionKey::Delta, 0.6, 0.3),
            limit(CriterionKey::Dte, 20.0, 30.0),
            limit(CriterionKey::Beta, 3.0, 1.0),
            Component {
                key: CriterionKey::Collateral,
                max: 10.0,
                earned: 2.0,
                finding: Finding::Collateral {
                    amount: 60_000.0,
                    tier: Tier::Unfavorable,
                },
            },
        ];
        let pool = penalty_pool(&components);
        assert!((pool - (0.5 + 2.0 / 3.0)).abs() < 1e-12, "pool={}", pool);
    }

    #[test]
    fn test_penalties_are_capped() {
        assert_eq!(penalties_applied(0.0, 15.0), 0.0);
        assert!((penalties_applied(0.5, 15.0) - 7.5).abs() < 1e-12);
        assert_eq!(penalties_applied(1.7, 15.0), 15.0);
        assert_eq!(penalties_applied(0.9, 0.0), 0.0);
    }
}
