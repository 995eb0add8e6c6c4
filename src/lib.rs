pub mod account;
pub mod book;
pub mod common;
pub mod config;
pub mod exchange;
pub mod history;
pub mod market;
pub mod offer;
pub mod ticker;
pub mod token;
pub mod trade;
