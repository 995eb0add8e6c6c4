use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{Amount, Price};
use crate::offer::Offer;

/// An offer that has been executed, stamped with its execution time
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Trade {
    pub time: DateTime<Utc>,
    pub offer: Offer,
}

impl Trade {
    pub fn new(time: DateTime<Utc>, offer: Offer) -> Self {
        Self { time, offer }
    }

    pub fn is_bid(&self) -> bool {
        self.offer.is_bid()
    }

    pub fn price(&self) -> Price {
        self.offer.price()
    }

    pub fn base_amount(&self) -> Amount {
        self.offer.base_amount()
    }

    pub fn counter_amount(&self) -> Amount {
        self.offer.counter_amount()
    }
}
