use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::Amount;
use crate::market::Currency;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AccountError {
    #[error("no balance held in {0}")]
    AssetNotFound(Currency),
    #[error("available {available} exceeds total {total}")]
    AvailableExceedsTotal { total: Amount, available: Amount },
}

/// Funds held in one currency
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Balance {
    pub total: Amount,
    /// Portion of `total` not committed to resting offers
    pub available: Amount,
}

impl Balance {
    pub fn new(total: Amount, available: Amount) -> Result<Self, AccountError> {
        if available > total {
            return Err(AccountError::AvailableExceedsTotal { total, available });
        }

        Ok(Self { total, available })
    }

    pub fn locked(&self) -> Amount {
        self.total - self.available
    }
}

pub type Balances = HashMap<Currency, Balance>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Account {
    holdings: Balances,
}

impl Account {
    pub fn balance(&self, currency: &Currency) -> Result<Balance, AccountError> {
        self.holdings
            .get(currency)
            .copied()
            .ok_or_else(|| AccountError::AssetNotFound(currency.clone()))
    }

    pub fn set_balance(&mut self, currency: Currency, balance: Balance) {
        self.holdings.insert(currency, balance);
    }

    pub fn balances(&self) -> &Balances {
        &self.holdings
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_balance_rejects_available_above_total() {
        assert_eq!(
            Balance::new(dec!(1), dec!(2)),
            Err(AccountError::AvailableExceedsTotal {
                total: dec!(1),
                available: dec!(2)
            })
        );
    }

    #[test]
    fn test_locked() {
        let balance = Balance::new(dec!(10), dec!(7.5)).unwrap();
        assert_eq!(balance.locked(), dec!(2.5));
    }

    #[test]
    fn test_account_lookup() {
        let usd = Currency::new("USD");
        let mut account = Account::default();

        assert_eq!(
            account.balance(&usd),
            Err(AccountError::AssetNotFound(usd.clone()))
        );

        account.set_balance(usd.clone(), Balance::new(dec!(5), dec!(5)).unwrap());

        assert_eq!(account.balance(&usd).unwrap().total, dec!(5));
    }
}
