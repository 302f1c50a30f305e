//! Configuration structs for the scoring policy.

use serde::{Deserialize, Serialize};

/// Credit curve applied when a value exceeds its tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    /// `(tolerance / value)²`: 2x over the limit keeps 25% of the points.
    InverseSquare,
    /// `tolerance / value`: 2x over the limit keeps 50% of the points.
    Linear,
}

impl Falloff {
    /// Fraction of a criterion's weight earned at `value` against `tolerance`.
    pub fn credit(self, value: f64, tolerance: f64) -> f64 {
        if value <= tolerance {
            return 1.0;
        }
        let ratio = tolerance / value;
        let credit = match self {
            Falloff::InverseSquare => ratio * ratio,
            Falloff::Linear => ratio,
        };
        credit.clamp(0.0, 1.0)
    }
}

/// Named policy presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// ROI hard fail, inverse-square falloff and the penalty pool.
    Extended,
    /// Plain proportional scoring: no hard fail, linear falloff, no pool.
    Proportional,
}

impl PolicyPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "extended" | "v2" => Some(PolicyPreset::Extended),
            "proportional" | "simple" | "v1" => Some(PolicyPreset::Proportional),
            _ => None,
        }
    }
}

/// Points available per criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionWeights {
    #[serde(default = "default_roi_weight")]
    pub roi: f64,
    #[serde(default = "default_delta_weight")]
    pub delta: f64,
    #[serde(default = "default_dte_weight")]
    pub dte: f64,
    #[serde(default = "default_beta_weight")]
    pub beta: f64,
    #[serde(default = "default_collateral_weight")]
    pub collateral: f64,
    #[serde(default = "default_support_weight")]
    pub support: f64,
}

/// Collateral-at-risk tiers, in dollars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollateralTiers {
    /// Collateral strictly below this earns full credit.
    #[serde(default = "default_collateral_low_below")]
    pub low_below: f64,
    /// Collateral strictly above this is "high"; the band in between is moderate.
    #[serde(default = "default_collateral_high_above")]
    pub high_above: f64,
    #[serde(default = "default_half_credit")]
    pub moderate_credit: f64,
    #[serde(default = "default_weak_credit")]
    pub high_credit: f64,
}

/// Support-variance tiers, in percent of strike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportTiers {
    #[serde(default = "default_support_strong_at")]
    pub strong_at: f64,
    #[serde(default = "default_support_moderate_at")]
    pub moderate_at: f64,
    #[serde(default = "default_half_credit")]
    pub moderate_credit: f64,
    #[serde(default = "default_weak_credit")]
    pub weak_credit: f64,
}

/// Score cut-offs for the suggestion buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketThresholds {
    #[serde(default = "default_conservative_at")]
    pub conservative_at: f64,
    #[serde(default = "default_neutral_at")]
    pub neutral_at: f64,
}

/// Full scoring policy for the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringPolicy {
    #[serde(default = "default_true")]
    pub hard_fail_enabled: bool,

    /// Hard-fail ROI threshold used when the caller sets no `minROI`.
    #[serde(default = "default_hard_fail_min_roi")]
    pub hard_fail_min_roi: f64,

    #[serde(default = "default_falloff")]
    pub falloff: Falloff,

    /// Maximum points deducted by the penalty pool. Zero disables it.
    #[serde(default = "default_penalty_cap")]
    pub penalty_cap: f64,

    #[serde(default)]
    pub weights: CriterionWeights,

    #[serde(default)]
    pub collateral: CollateralTiers,

    #[serde(default)]
    pub support: SupportTiers,

    #[serde(default)]
    pub buckets: BucketThresholds,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_hard_fail_min_roi() -> f64 {
    0.30
}
fn default_falloff() -> Falloff {
    Falloff::InverseSquare
}
fn default_penalty_cap() -> f64 {
    15.0
}
fn default_roi_weight() -> f64 {
    35.0
}
fn default_delta_weight() -> f64 {
    25.0
}
fn default_dte_weight() -> f64 {
    15.0
}
fn default_beta_weight() -> f64 {
    5.0
}
fn default_collateral_weight() -> f64 {
    10.0
}
fn default_support_weight() -> f64 {
    10.0
}
fn default_collateral_low_below() -> f64 {
    20_000.0
}
fn default_collateral_high_above() -> f64 {
    50_000.0
}
fn default_half_credit() -> f64 {
    0.5
}
fn default_weak_credit() -> f64 {
    0.2
}
fn default_support_strong_at() -> f64 {
    10.0
}
fn default_support_moderate_at() -> f64 {
    5.0
}
fn default_conservative_at() -> f64 {
    90.0
}
fn default_neutral_at() -> f64 {
    70.0
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            roi: default_roi_weight(),
            delta: default_delta_weight(),
            dte: default_dte_weight(),
            beta: default_beta_weight(),
            collateral: default_collateral_weight(),
            support: default_support_weight(),
        }
    }
}

impl Default for CollateralTiers {
    fn default() -> Self {
        Self {
            low_below: default_collateral_low_below(),
            high_above: default_collateral_high_above(),
            moderate_credit: default_half_credit(),
            high_credit: default_weak_credit(),
        }
    }
}

impl Default for SupportTiers {
    fn default() -> Self {
        Self {
            strong_at: default_support_strong_at(),
            moderate_at: default_support_moderate_at(),
            moderate_credit: default_half_credit(),
            weak_credit: default_weak_credit(),
        }
    }
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            conservative_at: default_conservative_at(),
            neutral_at: default_neutral_at(),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::extended()
    }
}

impl ScoringPolicy {
    pub fn extended() -> Self {
        Self {
            hard_fail_enabled: true,
            hard_fail_min_roi: default_hard_fail_min_roi(),
            falloff: default_falloff(),
            penalty_cap: default_penalty_cap(),
            weights: CriterionWeights::default(),
            collateral: CollateralTiers::default(),
            support: SupportTiers::default(),
            buckets: BucketThresholds::default(),
        }
    }

    pub fn proportional() -> Self {
        Self {
            hard_fail_enabled: false,
            falloff: Falloff::Linear,
            penalty_cap: 0.0,
            ..Self::extended()
        }
    }

    pub fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Extended => Self::extended(),
            PolicyPreset::Proportional => Self::proportional(),
        }
    }

    /// Collect every problem with the policy, prefixed with `scoring.`.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues: Vec<String> = Vec::new();

        if !self.hard_fail_min_roi.is_finite() || self.hard_fail_min_roi < 0.0 {
            issues.push("scoring.hard_fail_min_roi must be a number >= 0".into());
        }
        if !self.penalty_cap.is_finite() || self.penalty_cap < 0.0 {
            issues.push("scoring.penalty_cap must be a number >= 0".into());
        }

        let weights = [
            ("roi", self.weights.roi),
            ("delta", self.weights.delta),
            ("dte", self.weights.dte),
            ("beta", self.weights.beta),
            ("collateral", self.weights.collateral),
            ("support", self.weights.support),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                issues.push(format!("scoring.weights.{name} must be a number >= 0"));
            }
        }

        if self.collateral.low_below > self.collateral.high_above {
            issues.push("scoring.collateral.low_below must be <= high_above".into());
        }
        if self.support.moderate_at > self.support.strong_at {
            issues.push("scoring.support.moderate_at must be <= strong_at".into());
        }

        let credits = [
            ("collateral.moderate_credit", self.collateral.moderate_credit),
            ("collateral.high_credit", self.collateral.high_credit),
            ("support.moderate_credit", self.support.moderate_credit),
            ("support.weak_credit", self.support.weak_credit),
        ];
        for (name, credit) in credits {
            if !(0.0..=1.0).contains(&credit) {
                issues.push(format!("scoring.{name} must be in [0,1]"));
            }
        }

        let buckets = &self.buckets;
        if !(0.0..=100.0).contains(&buckets.conservative_at)
            || !(0.0..=100.0).contains(&buckets.neutral_at)
        {
            issues.push("scoring.buckets thresholds must be in [0,100]".into());
        }
        if buckets.neutral_at > buckets.conservative_at {
            issues.push("scoring.buckets.neutral_at must be <= conservative_at".into());
        }

        issues
    }
}
