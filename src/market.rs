use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseMarketError {
    #[error("empty currency symbol in {0:?}")]
    EmptySymbol(String),
    #[error("empty issuer in {0:?}")]
    EmptyIssuer(String),
    #[error("expected BASE/COUNTER, got {0:?}")]
    MissingSeparator(String),
}

/// A currency, optionally qualified by the party that issues it
#[derive(
    Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Currency {
    pub symbol: String,
    pub issuer: Option<String>,
}

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            issuer: None,
        }
    }

    pub fn issued(symbol: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            issuer: Some(issuer.into()),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "{}.{}", self.symbol, issuer),
            None => write!(f, "{}", self.symbol),
        }
    }
}

impl FromStr for Currency {
    type Err = ParseMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, issuer) = match s.split_once('.') {
            Some((symbol, issuer)) => (symbol, Some(issuer)),
            None => (s, None),
        };

        if symbol.is_empty() {
            return Err(ParseMarketError::EmptySymbol(s.to_string()));
        }

        match issuer {
            Some("") => Err(ParseMarketError::EmptyIssuer(s.to_string())),
            Some(issuer) => Ok(Self::issued(symbol, issuer)),
            None => Ok(Self::new(symbol)),
        }
    }
}

/// A currency pair; prices are quoted in counter per unit of base
#[derive(
    Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Market {
    pub base: Currency,
    pub counter: Currency,
}

impl Market {
    pub fn new(base: Currency, counter: Currency) -> Self {
        Self { base, counter }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.counter)
    }
}

impl FromStr for Market {
    type Err = ParseMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, counter) = s
            .split_once('/')
            .ok_or_else(|| ParseMarketError::MissingSeparator(s.to_string()))?;

        Ok(Self::new(base.parse()?, counter.parse()?))
    }
}
