use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::common::Price;
use crate::offer::{Offer, Side};

pub type Sequence = u64;

/// Source of strictly increasing arrival numbers for offer tokens
#[derive(Debug, Default)]
pub struct Sequencer {
    next: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide sequencer
    ///
    /// Created on first use and never reset. Every book that does not inject
    /// its own sequencer draws from this one, so tokens from different books
    /// still form a single total order.
    pub fn shared() -> Arc<Sequencer> {
        static SHARED: OnceLock<Arc<Sequencer>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Sequencer::new())).clone()
    }

    pub fn next(&self) -> Sequence {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// Handle for one offer resting in a book
///
/// Tokens sort best offer first within a side: the key is the negated price
/// for bids and the price itself for asks, with arrival order breaking ties.
#[derive(
    Copy,
    Clone,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct OfferToken {
    key: Price,
    sequence: Sequence,
}

impl OfferToken {
    pub fn derive(offer: &Offer, sequencer: &Sequencer) -> Self {
        let key = match offer.side() {
            Side::Bid => -offer.price(),
            Side::Ask => offer.price(),
        };

        Self {
            key,
            sequence: sequencer.next(),
        }
    }

    pub fn is_bid(&self) -> bool {
        self.key.is_sign_negative()
    }

    pub fn side(&self) -> Side {
        if self.is_bid() {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    pub fn key(&self) -> Price {
        self.key
    }

    pub fn price(&self) -> Price {
        self.key.abs()
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }
}

impl Display for OfferToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}#{}", self.side(), self.price(), self.sequence)
    }
}
