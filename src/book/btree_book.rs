use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    book::{Book, BookError},
    common::{Amount, Price},
    market::Market,
    offer::{Offer, Side},
    token::{OfferToken, Sequencer},
};

/// Remaining base quantity per price, best price first on each side
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Levels {
    pub bids: Vec<(Price, Amount)>,
    pub asks: Vec<(Price, Amount)>,
}

/// Limit order book where each side of the book is an ordered mapping (using
/// B-trees) keyed on offer tokens
#[derive(Clone, Debug)]
pub struct BTreeBook {
    /// Currency pair this book trades
    market: Market,
    /// Issues the arrival numbers embedded in tokens
    sequencer: Arc<Sequencer>,
    /// Bid-side of the market
    bids: BTreeMap<OfferToken, Offer>,
    /// Ask-side of the market
    asks: BTreeMap<OfferToken, Offer>,
}

impl Display for BTreeBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let levels = self.levels();
        let col_width = 17;

        writeln!(f, "{:>17} | {:<17}", "BIDS", "ASKS")?;

        for ask in levels.asks.iter().rev() {
            writeln!(
                f,
                "{} | {:<8.2} {:<8.2}",
                " ".repeat(col_width),
                ask.0,
                ask.1
            )?;
        }

        for bid in levels.bids.iter() {
            writeln!(f, "{:8.2} {:8.2} |", bid.0, bid.1)?;
        }

        Ok(())
    }
}

impl BTreeBook {
    /// Create an empty book drawing tokens from the process-wide sequencer
    pub fn new(market: Market) -> Self {
        Self::with_sequencer(market, Sequencer::shared())
    }

    pub fn with_sequencer(market: Market, sequencer: Arc<Sequencer>) -> Self {
        Self {
            market,
            sequencer,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    fn side(&self, side: Side) -> &BTreeMap<OfferToken, Offer> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<OfferToken, Offer> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Bids, highest price first
    pub fn bids(&self) -> impl Iterator<Item = (&OfferToken, &Offer)> {
        self.bids.iter()
    }

    /// Asks, lowest price first
    pub fn asks(&self) -> impl Iterator<Item = (&OfferToken, &Offer)> {
        self.asks.iter()
    }

    pub fn best_bid(&self) -> Option<(&OfferToken, &Offer)> {
        self.bids.first_key_value()
    }

    pub fn best_ask(&self) -> Option<(&OfferToken, &Offer)> {
        self.asks.first_key_value()
    }

    /// Mutable access to a resting offer, e.g. to record a fill
    pub fn offer_mut(&mut self, token: &OfferToken) -> Option<&mut Offer> {
        self.side_mut(token.side()).get_mut(token)
    }

    fn aggregate<'a>(
        side: impl Iterator<Item = (&'a OfferToken, &'a Offer)>,
    ) -> Vec<(Price, Amount)> {
        let mut levels: Vec<(Price, Amount)> = vec![];

        for (token, offer) in side {
            match levels.last_mut() {
                Some((price, quantity)) if *price == token.price() => {
                    *quantity += offer.base_remaining()
                }
                _ => levels.push((token.price(), offer.base_remaining())),
            }
        }

        levels
    }

    pub fn levels(&self) -> Levels {
        Levels {
            bids: Self::aggregate(self.bids.iter()),
            asks: Self::aggregate(self.asks.iter()),
        }
    }
}

impl Book for BTreeBook {
    type Error = BookError;

    fn market(&self) -> &Market {
        &self.market
    }

    fn offer(&self, token: &OfferToken) -> Option<&Offer> {
        self.side(token.side()).get(token)
    }

    fn add(&mut self, offer: Offer) -> OfferToken {
        let token = OfferToken::derive(&offer, &self.sequencer);
        trace!(market = %self.market, %token, "admitting offer");
        self.side_mut(offer.side()).insert(token, offer);
        token
    }

    fn add_many(&mut self, offers: Vec<Offer>) -> Vec<OfferToken> {
        let mut tokens = Vec::with_capacity(offers.len());
        let mut bids = BTreeMap::new();
        let mut asks = BTreeMap::new();

        for offer in offers {
            let token = OfferToken::derive(&offer, &self.sequencer);
            tokens.push(token);

            match offer.side() {
                Side::Bid => bids.insert(token, offer),
                Side::Ask => asks.insert(token, offer),
            };
        }

        debug!(
            market = %self.market,
            bids = bids.len(),
            asks = asks.len(),
            "admitting offers in bulk"
        );
        self.bids.append(&mut bids);
        self.asks.append(&mut asks);

        tokens
    }

    fn remove(&mut self, token: &OfferToken) -> Result<Offer, Self::Error> {
        match self.side_mut(token.side()).remove(token) {
            Some(offer) => {
                trace!(market = %self.market, %token, "removed offer");
                Ok(offer)
            }
            None => {
                debug!(market = %self.market, %token, "stale offer token");
                Err(BookError::OfferNotFound(*token))
            }
        }
    }

    fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    fn depth(&self) -> (Amount, Amount) {
        (
            self.bids.values().map(|x| x.base_remaining()).sum(),
            self.asks.values().map(|x| x.base_remaining()).sum(),
        )
    }

    fn top(&self) -> (Option<Price>, Option<Price>) {
        (
            self.bids.first_key_value().map(|x| x.1.price()),
            self.asks.first_key_value().map(|x| x.1.price()),
        )
    }

    fn crossed(&self) -> bool {
        match self.top() {
            (Some(best_bid), Some(best_ask)) => best_bid >= best_ask,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::common::Precision;
    use crate::market::Currency;

    use super::*;

    fn mock_market() -> Market {
        Market::new(Currency::new("BTC"), Currency::new("USD"))
    }

    fn mock_book() -> BTreeBook {
        BTreeBook::with_sequencer(mock_market(), Arc::new(Sequencer::new()))
    }

    fn bid(base: Amount, counter: Amount) -> Offer {
        Offer::bid(base, counter, Precision::default()).unwrap()
    }

    fn ask(base: Amount, counter: Amount) -> Offer {
        Offer::ask(base, counter, Precision::default()).unwrap()
    }

    fn bid_prices(book: &BTreeBook) -> Vec<Price> {
        book.bids().map(|(_, offer)| offer.price()).collect()
    }

    fn ask_prices(book: &BTreeBook) -> Vec<Price> {
        book.asks().map(|(_, offer)| offer.price()).collect()
    }

    #[test]
    fn test_add_single_bid() {
        let mut book = mock_book();
        let offer = bid(dec!(1), dec!(9000));

        let token = book.add(offer.clone());

        assert!(token.is_bid());
        assert_eq!(book.offer(&token), Some(&offer));
        assert_eq!(book.len(), 1);
        assert_eq!(book.asks().count(), 0);
        assert_eq!(book.depth(), (dec!(1), Amount::ZERO));
    }

    #[test]
    fn test_add_single_ask() {
        let mut book = mock_book();
        let offer = ask(dec!(2), dec!(18400));

        let token = book.add(offer.clone());

        assert!(!token.is_bid());
        assert_eq!(book.offer(&token), Some(&offer));
        assert_eq!(book.bids().count(), 0);
        assert_eq!(book.top(), (None, Some(dec!(9200))));
    }

    #[test]
    fn test_sides_ordered_best_first() {
        let mut book = mock_book();

        book.add(bid(dec!(1), dec!(9000)));
        book.add(bid(dec!(1), dec!(9100)));
        book.add(ask(dec!(1), dec!(9200)));
        book.add(ask(dec!(1), dec!(9050)));

        assert_eq!(bid_prices(&book), vec![dec!(9100), dec!(9000)]);
        assert_eq!(ask_prices(&book), vec![dec!(9050), dec!(9200)]);
        assert_eq!(book.top(), (Some(dec!(9100)), Some(dec!(9050))));
        assert!(book.crossed());
    }

    #[test]
    fn test_equal_prices_keep_arrival_order() {
        let mut book = mock_book();

        let first = book.add_many(vec![ask(dec!(1), dec!(10))]);
        let second = book.add(ask(dec!(3), dec!(30)));
        let third = book.add_many(vec![ask(dec!(2), dec!(20))]);

        let order: Vec<OfferToken> =
            book.asks().map(|(token, _)| *token).collect();

        assert_eq!(order, vec![first[0], second, third[0]]);
    }

    #[test]
    fn test_add_then_remove_restores_empty_book() {
        let mut book = mock_book();
        let offer = bid(dec!(1), dec!(9000));

        let token = book.add(offer.clone());

        assert_eq!(book.remove(&token), Ok(offer));
        assert!(book.is_empty());
        assert_eq!(book.remove(&token), Err(BookError::OfferNotFound(token)));
    }

    #[test]
    fn test_remove_leaves_other_offers() {
        let mut book = mock_book();

        let tokens = book.add_many(vec![
            bid(dec!(1), dec!(9000)),
            bid(dec!(1), dec!(9100)),
            ask(dec!(1), dec!(9200)),
        ]);

        book.remove(&tokens[1]).unwrap();

        assert_eq!(bid_prices(&book), vec![dec!(9000)]);
        assert_eq!(ask_prices(&book), vec![dec!(9200)]);
        assert!(!book.crossed());
    }

    #[test]
    fn test_add_many_matches_repeated_add() {
        let offers = vec![
            bid(dec!(1), dec!(9000)),
            ask(dec!(1), dec!(9200)),
            bid(dec!(2), dec!(18200)),
        ];

        let mut bulk = mock_book();
        let bulk_tokens = bulk.add_many(offers.clone());

        let mut single = mock_book();
        let single_tokens: Vec<OfferToken> =
            offers.iter().map(|x| single.add(x.clone())).collect();

        assert_eq!(bulk_tokens, single_tokens);
        for (token, offer) in bulk_tokens.iter().zip(offers.iter()) {
            assert_eq!(bulk.offer(token), Some(offer));
        }
        assert!(check_bids(&bulk, &single));
        assert!(check_asks(&bulk, &single));
    }

    #[test]
    fn test_clear() {
        let mut book = mock_book();

        book.add_many(vec![bid(dec!(1), dec!(9000)), ask(dec!(1), dec!(9200))]);
        book.clear();

        assert!(book.is_empty());
        assert_eq!(book.top(), (None, None));
    }

    #[test]
    fn test_offer_mut_applies_fill() {
        let mut book = mock_book();
        let token = book.add(ask(dec!(4), dec!(40)));

        book.offer_mut(&token)
            .unwrap()
            .set_remaining(dec!(1), dec!(10))
            .unwrap();

        assert!(book.offer(&token).unwrap().is_partial());
        assert_eq!(book.depth(), (Amount::ZERO, dec!(1)));
    }

    #[test]
    fn test_levels_aggregate_equal_prices() {
        let mut book = mock_book();

        book.add_many(vec![
            bid(dec!(1), dec!(9000)),
            bid(dec!(2), dec!(18000)),
            bid(dec!(1), dec!(9100)),
            ask(dec!(1.5), dec!(13800)),
        ]);

        let expected = Levels {
            bids: vec![(dec!(9100), dec!(1)), (dec!(9000), dec!(3))],
            asks: vec![(dec!(9200), dec!(1.5))],
        };

        assert_eq!(book.levels(), expected);
    }

    #[test]
    fn test_books_share_global_order() {
        let mut first = BTreeBook::new(mock_market());
        let mut second = BTreeBook::new(mock_market());

        let a = first.add(ask(dec!(1), dec!(10)));
        let b = second.add(ask(dec!(1), dec!(10)));

        assert!(a < b);
    }

    #[test]
    fn test_display_lists_both_sides() {
        let mut book = mock_book();

        book.add_many(vec![bid(dec!(1), dec!(9000)), ask(dec!(1), dec!(9200))]);

        let rendered = book.to_string();

        assert!(rendered.starts_with("             BIDS | ASKS"));
        assert!(rendered.contains("9200.00"));
        assert!(rendered.contains("9000.00"));
    }

    fn check_bids(left: &BTreeBook, right: &BTreeBook) -> bool {
        left.bids == right.bids
    }

    fn check_asks(left: &BTreeBook, right: &BTreeBook) -> bool {
        left.asks == right.asks
    }
}
