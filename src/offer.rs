use std::fmt::Display;

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::{Amount, Precision, Price};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OfferError {
    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: Amount },
    #[error("{field} remaining {remaining} outside 0..={original}")]
    RemainingOutOfRange {
        field: &'static str,
        remaining: Amount,
        original: Amount,
    },
    #[error("{base} base remaining inconsistent with {counter} counter remaining")]
    InconsistentRemaining { base: Amount, counter: Amount },
    #[error("arithmetic overflow deriving {0}")]
    Overflow(&'static str),
    #[error("{0} underflows the decimal range")]
    Underflow(&'static str),
}

#[derive(
    Arbitrary, Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// A resting offer to trade base currency against counter currency
///
/// Only the remaining quantities change after construction; everything
/// else, including the price, is fixed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Offer {
    side: Side,
    base_amount: Amount,
    base_remaining: Amount,
    counter_amount: Amount,
    counter_remaining: Amount,
    /// Counter per unit of base, as originally offered
    price: Price,
    #[serde(skip)]
    precision: Precision,
}

impl Offer {
    pub fn new(
        side: Side,
        base_amount: Amount,
        counter_amount: Amount,
        precision: Precision,
    ) -> Result<Self, OfferError> {
        Self::check_positive("base_amount", base_amount)?;
        Self::check_positive("counter_amount", counter_amount)?;

        let price = precision
            .div(counter_amount, base_amount)
            .ok_or(OfferError::Overflow("price"))?;
        if price.is_zero() {
            return Err(OfferError::Underflow("price"));
        }

        Ok(Self {
            side,
            base_amount,
            base_remaining: base_amount,
            counter_amount,
            counter_remaining: counter_amount,
            price,
            precision,
        })
    }

    pub fn bid(
        base_amount: Amount,
        counter_amount: Amount,
        precision: Precision,
    ) -> Result<Self, OfferError> {
        Self::new(Side::Bid, base_amount, counter_amount, precision)
    }

    pub fn ask(
        base_amount: Amount,
        counter_amount: Amount,
        precision: Precision,
    ) -> Result<Self, OfferError> {
        Self::new(Side::Ask, base_amount, counter_amount, precision)
    }

    /// Build an offer for `base_amount` at `price`, deriving the counter amount
    pub fn from_price(
        side: Side,
        base_amount: Amount,
        price: Price,
        precision: Precision,
    ) -> Result<Self, OfferError> {
        Self::check_positive("price", price)?;
        let counter_amount = precision
            .mul(base_amount, price)
            .ok_or(OfferError::Overflow("counter_amount"))?;
        if counter_amount.is_zero() {
            return Err(OfferError::Underflow("counter_amount"));
        }

        Self::new(side, base_amount, counter_amount, precision)
    }

    fn check_positive(field: &'static str, value: Amount) -> Result<(), OfferError> {
        if value <= Amount::ZERO {
            Err(OfferError::NonPositiveAmount { field, value })
        } else {
            Ok(())
        }
    }

    fn check_remaining(
        field: &'static str,
        remaining: Amount,
        original: Amount,
    ) -> Result<(), OfferError> {
        if remaining < Amount::ZERO || remaining > original {
            Err(OfferError::RemainingOutOfRange {
                field,
                remaining,
                original,
            })
        } else {
            Ok(())
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_bid(&self) -> bool {
        self.side == Side::Bid
    }

    pub fn base_amount(&self) -> Amount {
        self.base_amount
    }

    pub fn base_remaining(&self) -> Amount {
        self.base_remaining
    }

    pub fn counter_amount(&self) -> Amount {
        self.counter_amount
    }

    pub fn counter_remaining(&self) -> Amount {
        self.counter_remaining
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Price of what is left of the offer, `None` once fully filled
    pub fn price_remaining(&self) -> Option<Price> {
        if self.base_remaining.is_zero() {
            return None;
        }

        self.precision
            .div(self.counter_remaining, self.base_remaining)
    }

    pub fn is_partial(&self) -> bool {
        self.base_remaining < self.base_amount
    }

    pub fn is_filled(&self) -> bool {
        self.base_remaining.is_zero()
    }

    /// Record a fill by setting both remaining quantities at once
    ///
    /// Leaves the offer untouched if either quantity falls outside
    /// `0..=original`, or if exactly one of them is zero.
    pub fn set_remaining(
        &mut self,
        base_remaining: Amount,
        counter_remaining: Amount,
    ) -> Result<(), OfferError> {
        Self::check_remaining("base", base_remaining, self.base_amount)?;
        Self::check_remaining(
            "counter",
            counter_remaining,
            self.counter_amount,
        )?;
        if base_remaining.is_zero() != counter_remaining.is_zero() {
            return Err(OfferError::InconsistentRemaining {
                base: base_remaining,
                counter: counter_remaining,
            });
        }

        self.base_remaining = base_remaining;
        self.counter_remaining = counter_remaining;
        Ok(())
    }
}
