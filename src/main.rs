use std::io::{self, BufRead};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use eyre::eyre;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use offerbook::{
    book::{btree_book::BTreeBook, Book},
    common::{Amount, Precision, Price},
    config::Config,
    history::History,
    market::Market,
    offer::{Offer, Side},
    ticker::Ticker,
    token::OfferToken,
    trade::Trade,
};

/// Maintain an order book and trade history from JSON commands on stdin
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Market traded by the book, as BASE/COUNTER
    #[arg(short, long, default_value = "BTC/USD")]
    market: Market,
    /// Significant digits for derived prices (overrides the config file)
    #[arg(short, long)]
    precision: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Command {
    Add {
        side: Side,
        base: Amount,
        counter: Option<Amount>,
        price: Option<Price>,
    },
    Remove {
        token: OfferToken,
    },
    Clear,
    Trade {
        time: DateTime<Utc>,
        side: Side,
        base: Amount,
        counter: Amount,
    },
    Ticker {
        since: DateTime<Utc>,
    },
}

struct Session {
    precision: Precision,
    book: BTreeBook,
    history: History,
}

impl Session {
    fn apply(&mut self, command: Command) -> eyre::Result<serde_json::Value> {
        match command {
            Command::Add {
                side,
                base,
                counter,
                price,
            } => {
                let offer = match (counter, price) {
                    (Some(counter), None) => {
                        Offer::new(side, base, counter, self.precision)?
                    }
                    (None, Some(price)) => {
                        Offer::from_price(side, base, price, self.precision)?
                    }
                    _ => {
                        return Err(eyre!(
                            "exactly one of `counter` and `price` is required"
                        ))
                    }
                };
                let token = self.book.add(offer);
                Ok(json!({ "token": token }))
            }
            Command::Remove { token } => {
                let offer = self.book.remove(&token)?;
                Ok(json!({ "removed": offer }))
            }
            Command::Clear => {
                self.book.clear();
                self.history.clear();
                Ok(json!({ "cleared": true }))
            }
            Command::Trade {
                time,
                side,
                base,
                counter,
            } => {
                let offer = Offer::new(side, base, counter, self.precision)?;
                self.history.add(Trade::new(time, offer));
                Ok(json!({ "trades": self.history.len() }))
            }
            Command::Ticker { since } => {
                let ticker = Ticker::snapshot(
                    &self.book,
                    &self.history,
                    since,
                    Utc::now(),
                )?;
                Ok(serde_json::to_value(ticker)?)
            }
        }
    }
}

fn main() -> eyre::Result<()> {
    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(digits) = opts.precision {
        config.precision = Precision::new(digits)?;
    }
    config.logging.init();

    info!(market = %opts.market, digits = config.precision.digits(), "starting");

    let mut session = Session {
        precision: config.precision,
        book: BTreeBook::new(opts.market.clone()),
        history: History::new(opts.market),
    };

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;

        if line.trim() == "exit" {
            break;
        }

        match serde_json::from_str(&line) {
            Ok(command) => match session.apply(command) {
                Ok(reply) => println!("{reply}"),
                Err(e) => println!("Rejected command: {e}"),
            },
            Err(e) => println!("Malformed command JSON: {e:?}"),
        }

        println!("{}", session.book);
    }

    Ok(())
}
