//! Pure American-odds arithmetic. No I/O, no state.
//!
//! Monetary values use the domain Decimal so payouts like +120 -> 1.2 are
//! exact; probabilities are plain f64.

use crate::domain::Decimal;
use thiserror::Error;

/// Largest magnitude accepted as a real-world American odds quote.
pub const MAX_ODDS_MAGNITUDE: i64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OddsError {
    #[error("american odds {0} outside sane range (0 or 100..=100000 in magnitude)")]
    OutOfRange(i32),
}

/// American odds are either 0 (unknown/void) or at least ±100.
pub fn validate_odds(odds: i32) -> Result<(), OddsError> {
    let magnitude = (odds as i64).abs();
    if magnitude == 0 || (100..=MAX_ODDS_MAGNITUDE).contains(&magnitude) {
        Ok(())
    } else {
        Err(OddsError::OutOfRange(odds))
    }
}

/// Break-even win probability encoded by an American odds quote.
pub fn implied_probability(odds: i32) -> f64 {
    if odds >= 0 {
        100.0 / (odds as f64 + 100.0)
    } else {
        let magnitude = -(odds as f64);
        magnitude / (magnitude + 100.0)
    }
}

/// Profit on a winning bet at `stake`. Zero for missing or void odds.
pub fn theoretical_return(odds: Option<i32>, stake: Decimal) -> Decimal {
    match odds {
        None | Some(0) => Decimal::zero(),
        Some(o) if o > 0 => stake * Decimal::from_i32(o) / Decimal::hundred(),
        Some(o) => stake * Decimal::hundred() / Decimal::from_i32(o).abs(),
    }
}

/// Realized profit/loss for a settled pick.
///
/// A loss is the flat stake, not `-theoretical_return`: the pool models a
/// fixed unit wager per pick regardless of the odds attached to it.
pub fn realized_return(odds: Option<i32>, is_correct: bool, stake: Decimal) -> Decimal {
    if is_correct {
        theoretical_return(odds, stake)
    } else {
        -stake
    }
}

/// Inverse of `implied_probability`. Degenerate probabilities map to 0.
pub fn probability_to_american_odds(p: f64) -> i32 {
    if !(0.0..=1.0).contains(&p) || p == 0.0 || p == 1.0 {
        return 0;
    }
    if p >= 0.5 {
        (-(100.0 * p / (1.0 - p)).round()) as i32
    } else {
        (100.0 * (1.0 - p) / p).round() as i32
    }
}
