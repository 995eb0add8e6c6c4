use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::account::{Account, Balance, Balances};
use crate::book::btree_book::BTreeBook;
use crate::history::History;
use crate::market::{Currency, Market};
use crate::token::Sequencer;
use crate::trade::Trade;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ExchangeError {
    #[error("market {0} is not listed")]
    UnknownMarket(Market),
}

/// What an exchange connector provides: listed markets, their trades and
/// order books, and the account's balances
pub trait Exchange {
    fn name(&self) -> &str;
    fn markets(&self) -> Vec<Market>;
    fn trades(&self, market: &Market) -> Result<Vec<Trade>, ExchangeError>;
    fn orderbook(&self, market: &Market) -> Result<BTreeBook, ExchangeError>;
    fn balances(&self) -> Balances;
}

#[derive(Clone, Debug)]
struct Listing {
    book: BTreeBook,
    history: History,
}

/// Exchange held entirely in memory, e.g. for replaying recorded data
#[derive(Clone, Debug)]
pub struct MemoryExchange {
    name: String,
    sequencer: Arc<Sequencer>,
    listings: HashMap<Market, Listing>,
    account: Account,
}

impl MemoryExchange {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_sequencer(name, Sequencer::shared())
    }

    pub fn with_sequencer(
        name: impl Into<String>,
        sequencer: Arc<Sequencer>,
    ) -> Self {
        Self {
            name: name.into(),
            sequencer,
            listings: HashMap::new(),
            account: Account::default(),
        }
    }

    /// List a market with an empty book and history; no-op if already listed
    pub fn list(&mut self, market: Market) {
        if self.listings.contains_key(&market) {
            return;
        }

        debug!(exchange = %self.name, %market, "listing market");
        let listing = Listing {
            book: BTreeBook::with_sequencer(
                market.clone(),
                self.sequencer.clone(),
            ),
            history: History::new(market.clone()),
        };
        self.listings.insert(market, listing);
    }

    fn listing_mut(
        &mut self,
        market: &Market,
    ) -> Result<&mut Listing, ExchangeError> {
        self.listings
            .get_mut(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.clone()))
    }

    fn listing(&self, market: &Market) -> Result<&Listing, ExchangeError> {
        self.listings
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.clone()))
    }

    pub fn book_mut(
        &mut self,
        market: &Market,
    ) -> Result<&mut BTreeBook, ExchangeError> {
        Ok(&mut self.listing_mut(market)?.book)
    }

    pub fn history_mut(
        &mut self,
        market: &Market,
    ) -> Result<&mut History, ExchangeError> {
        Ok(&mut self.listing_mut(market)?.history)
    }

    pub fn set_balance(&mut self, currency: Currency, balance: Balance) {
        self.account.set_balance(currency, balance);
    }
}

impl Exchange for MemoryExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn markets(&self) -> Vec<Market> {
        let mut markets: Vec<Market> = self.listings.keys().cloned().collect();
        markets.sort();
        markets
    }

    fn trades(&self, market: &Market) -> Result<Vec<Trade>, ExchangeError> {
        Ok(self.listing(market)?.history.iter().cloned().collect())
    }

    fn orderbook(&self, market: &Market) -> Result<BTreeBook, ExchangeError> {
        Ok(self.listing(market)?.book.clone())
    }

    fn balances(&self) -> Balances {
        self.account.balances().clone()
    }
}
