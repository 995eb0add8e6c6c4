use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Amount = Decimal;
pub type Price = Decimal;

#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum PrecisionError {
    #[error("precision must be between {min} and {max} significant digits, got {digits}")]
    OutOfRange { digits: u32, min: u32, max: u32 },
}

/// Working precision for derived amounts and prices, in significant digits
#[derive(
    Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Precision {
    digits: u32,
}

impl Precision {
    pub const MIN_DIGITS: u32 = 8;
    pub const MAX_DIGITS: u32 = 28;

    pub fn new(digits: u32) -> Result<Self, PrecisionError> {
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PrecisionError::OutOfRange {
                digits,
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self { digits })
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Round `value` to this precision (half to even)
    pub fn round(&self, value: Decimal) -> Decimal {
        // `None` only when rounding up would overflow; keep every digit then
        value
            .round_sf_with_strategy(
                self.digits,
                RoundingStrategy::MidpointNearestEven,
            )
            .unwrap_or(value)
    }

    pub fn mul(&self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_mul(rhs).map(|x| self.round(x))
    }

    pub fn div(&self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_div(rhs).map(|x| self.round(x))
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            digits: Self::MIN_DIGITS,
        }
    }
}

impl TryFrom<u32> for Precision {
    type Error = PrecisionError;

    fn try_from(digits: u32) -> Result<Self, Self::Error> {
        Self::new(digits)
    }
}

impl From<Precision> for u32 {
    fn from(precision: Precision) -> Self {
        precision.digits
    }
}
