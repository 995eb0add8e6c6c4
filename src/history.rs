use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace};

use crate::market::Market;
use crate::trade::Trade;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HistoryError {
    #[error("no trades recorded")]
    Empty,
    #[error("trade at {0} not recorded")]
    TradeNotFound(DateTime<Utc>),
}

/// Execution time, then arrival within this history
type TradeKey = (DateTime<Utc>, u64);

/// Record of executed trades in one market, oldest first
///
/// Trades sharing a timestamp keep the order in which they were added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct History {
    market: Market,
    trades: BTreeMap<TradeKey, Trade>,
    /// Arrival counter breaking ties between equal timestamps
    arrivals: u64,
}

impl History {
    pub fn new(market: Market) -> Self {
        Self {
            market,
            trades: BTreeMap::new(),
            arrivals: 0,
        }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    /// The most recently executed trade
    pub fn last(&self) -> Result<&Trade, HistoryError> {
        self.trades
            .last_key_value()
            .map(|(_, trade)| trade)
            .ok_or(HistoryError::Empty)
    }

    pub fn first(&self) -> Result<&Trade, HistoryError> {
        self.trades
            .first_key_value()
            .map(|(_, trade)| trade)
            .ok_or(HistoryError::Empty)
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    /// Record a trade, which need not be the latest one (e.g. when paging
    /// an exchange's feed backwards)
    pub fn add(&mut self, trade: Trade) {
        let key = (trade.time, self.arrivals);
        self.arrivals += 1;
        trace!(market = %self.market, time = %trade.time, "recording trade");
        self.trades.insert(key, trade);
    }

    pub fn add_many(&mut self, trades: impl IntoIterator<Item = Trade>) {
        let before = self.trades.len();
        trades.into_iter().for_each(|x| self.add(x));
        debug!(
            market = %self.market,
            added = self.trades.len() - before,
            "recorded trades in bulk"
        );
    }

    /// Remove the earliest recorded trade equal to `trade`
    pub fn remove(&mut self, trade: &Trade) -> Result<Trade, HistoryError> {
        let key = self
            .trades
            .range((trade.time, 0)..=(trade.time, u64::MAX))
            .find(|(_, x)| *x == trade)
            .map(|(key, _)| *key);

        match key.and_then(|key| self.trades.remove(&key)) {
            Some(removed) => Ok(removed),
            None => {
                debug!(market = %self.market, time = %trade.time, "trade not recorded");
                Err(HistoryError::TradeNotFound(trade.time))
            }
        }
    }

    /// Trades executed in `[start, end)`, oldest first
    pub fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl DoubleEndedIterator<Item = &Trade> {
        let end = end.max(start);
        self.trades.range((start, 0)..(end, 0)).map(|(_, trade)| trade)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.values()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
