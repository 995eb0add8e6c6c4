use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::common::{Amount, Price};
use crate::history::{History, HistoryError};
use crate::trade::Trade;

/// Summary of a market over a time window
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ticker {
    pub time: DateTime<Utc>,
    /// Best resting bid, if any
    pub bid: Option<Price>,
    /// Best resting ask, if any
    pub ask: Option<Price>,
    pub last: Price,
    /// Base currency traded in the window
    pub volume: Amount,
    /// Counter currency traded in the window
    pub volume_traded: Amount,
    pub open: Price,
    pub close: Price,
    pub high: Price,
    pub low: Price,
}

impl Ticker {
    /// Summarise trades in `[since, until)` against the current book
    ///
    /// Open, close, high and low fall back to the last traded price when
    /// nothing traded inside the window.
    pub fn snapshot<B: Book>(
        book: &B,
        history: &History,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Self, HistoryError> {
        let last = history.last()?.price();
        let (bid, ask) = book.top();
        let window: Vec<&Trade> = history.between(since, until).collect();

        let prices = window.iter().map(|x| x.price());

        Ok(Self {
            time: until,
            bid,
            ask,
            last,
            volume: window.iter().map(|x| x.base_amount()).sum(),
            volume_traded: window.iter().map(|x| x.counter_amount()).sum(),
            open: window.first().map(|x| x.price()).unwrap_or(last),
            close: window.last().map(|x| x.price()).unwrap_or(last),
            high: prices.clone().max().unwrap_or(last),
            low: prices.min().unwrap_or(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::book::btree_book::BTreeBook;
    use crate::common::Precision;
    use crate::market::{Currency, Market};
    use crate::offer::Offer;
    use crate::token::Sequencer;

    use super::*;

    fn mock_market() -> Market {
        Market::new(Currency::new("BTC"), Currency::new("USD"))
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn trade(hour: u32, base: Amount, counter: Amount) -> Trade {
        Trade::new(
            at(hour),
            Offer::ask(base, counter, Precision::default()).unwrap(),
        )
    }

    #[test]
    fn test_snapshot_requires_a_trade() {
        let book =
            BTreeBook::with_sequencer(mock_market(), Arc::new(Sequencer::new()));
        let history = History::new(mock_market());

        assert_eq!(
            Ticker::snapshot(&book, &history, at(0), at(23)),
            Err(HistoryError::Empty)
        );
    }

    #[test]
    fn test_snapshot_summarises_window() {
        let precision = Precision::default();
        let mut book =
            BTreeBook::with_sequencer(mock_market(), Arc::new(Sequencer::new()));
        book.add(Offer::bid(dec!(1), dec!(8950), precision).unwrap());
        book.add(Offer::ask(dec!(1), dec!(9250), precision).unwrap());

        let mut history = History::new(mock_market());
        history.add_many(vec![
            trade(8, dec!(1), dec!(8800)),
            trade(10, dec!(1), dec!(9000)),
            trade(11, dec!(2), dec!(18400)),
            trade(12, dec!(0.5), dec!(4550)),
            trade(14, dec!(1), dec!(9300)),
        ]);

        let ticker = Ticker::snapshot(&book, &history, at(9), at(13)).unwrap();

        assert_eq!(ticker.time, at(13));
        assert_eq!(ticker.bid, Some(dec!(8950)));
        assert_eq!(ticker.ask, Some(dec!(9250)));
        assert_eq!(ticker.last, dec!(9300));
        assert_eq!(ticker.volume, dec!(3.5));
        assert_eq!(ticker.volume_traded, dec!(31950));
        assert_eq!(ticker.open, dec!(9000));
        assert_eq!(ticker.close, dec!(9100));
        assert_eq!(ticker.high, dec!(9200));
        assert_eq!(ticker.low, dec!(9000));
    }

    #[test]
    fn test_empty_window_falls_back_to_last() {
        let book =
            BTreeBook::with_sequencer(mock_market(), Arc::new(Sequencer::new()));
        let mut history = History::new(mock_market());
        history.add(trade(8, dec!(1), dec!(8800)));

        let ticker = Ticker::snapshot(&book, &history, at(9), at(13)).unwrap();

        assert_eq!((ticker.bid, ticker.ask), (None, None));
        assert_eq!(ticker.volume, Amount::ZERO);
        assert_eq!(ticker.open, dec!(8800));
        assert_eq!(ticker.low, dec!(8800));
    }
}
