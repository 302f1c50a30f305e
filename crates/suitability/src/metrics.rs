//! Derived trade metrics.
//!
//! Computed once per trade, independent of tolerances. Divisions by strike are
//! guarded (`strike > 0`); any other non-finite result is a computation fault
//! for that trade.

use chrono::NaiveDate;
use common::{Error, OptionType, Trade};

/// Shares per option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeMetrics {
    /// Calendar days to expiration, never below 1.
    pub dte: i64,
    /// Premium collected per contract, in dollars.
    pub premium: f64,
    pub breakeven: f64,
    /// Annualized ROI as a decimal fraction.
    pub annual_roi: f64,
    /// Cash securing one contract, in dollars.
    pub collateral_at_risk: f64,
    /// Cushion between strike and support, in percent of strike. Puts only.
    pub support_variance_pct: Option<f64>,
}

/// Whole calendar days between the two dates, clamped to 1 so same-day and
/// past expirations count as a one-day hold.
pub fn days_to_expiration(trade_date: NaiveDate, expiration_date: NaiveDate) -> i64 {
    (expiration_date - trade_date).num_days().max(1)
}

pub fn annualized_roi(bid: f64, strike: f64, dte: i64) -> f64 {
    if strike > 0.0 {
        (bid / strike) * (DAYS_PER_YEAR / dte as f64)
    } else {
        0.0
    }
}

pub fn support_variance_pct(trade: &Trade) -> Option<f64> {
    if trade.option_type != OptionType::Put || trade.strike <= 0.0 {
        return None;
    }
    trade
        .support_level
        .map(|support| ((support - trade.strike) / trade.strike) * 100.0)
}

fn ensure_finite(symbol: &str, metric: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::ComputationFault {
            symbol: symbol.to_string(),
            metric,
        })
    }
}

impl TradeMetrics {
    pub fn derive(trade: &Trade) -> Result<Self, Error> {
        let symbol = trade.symbol.as_str();

        // Inputs feed comparisons later on, so reject them up front too.
        ensure_finite(symbol, "strike", trade.strike)?;
        ensure_finite(symbol, "bid", trade.bid)?;
        ensure_finite(symbol, "beta", trade.beta)?;
        ensure_finite(symbol, "delta", trade.delta)?;

        let dte = days_to_expiration(trade.trade_date, trade.expiration_date);
        let breakeven = match trade.option_type {
            OptionType::Put => trade.strike - trade.bid,
            OptionType::Call => trade.strike + trade.bid,
        };
        let support_variance_pct = match support_variance_pct(trade) {
            Some(pct) => Some(ensure_finite(symbol, "supportVariancePct", pct)?),
            None => None,
        };

        Ok(Self {
            dte,
            premium: ensure_finite(symbol, "premium", trade.bid * CONTRACT_MULTIPLIER)?,
            breakeven: ensure_finite(symbol, "breakeven", breakeven)?,
            annual_roi: ensure_finite(
                symbol,
                "annualROI",
                annualized_roi(trade.bid, trade.strike, dte),
            )?,
            collateral_at_risk: ensure_finite(
                symbol,
                "collateralAtRisk",
                trade.strike * CONTRACT_MULTIPLIER,
            )?,
            support_variance_pct,
        })
    }
}
