//! Lossless decimal numeric type for stakes and payouts.
//!
//! Backed by rust_decimal so that returns like `+120 -> 1.2` are exact and
//! leaderboard sums never drift the way f64 accumulation would.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Monetary amount (unit-stake returns, leaderboard totals).
///
/// Serializes to a JSON number; stored in SQLite as a canonical string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse losslessly from a string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format as a canonical string (trailing zeros trimmed, no exponent).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn from_i32(v: i32) -> Self {
        Decimal(RustDecimal::from(v))
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Lossy conversion for display-adjacent math (win rates, averages).
    pub fn to_f64(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}
