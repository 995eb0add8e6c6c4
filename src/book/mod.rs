pub mod btree_book;

use std::fmt::Debug;

use thiserror::Error;

use crate::{
    common::{Amount, Price},
    market::Market,
    offer::Offer,
    token::OfferToken,
};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BookError {
    #[error("no offer in book for token {0}")]
    OfferNotFound(OfferToken),
}

pub trait Book: Clone + Debug {
    type Error;

    fn market(&self) -> &Market;
    fn offer(&self, token: &OfferToken) -> Option<&Offer>;
    fn add(&mut self, offer: Offer) -> OfferToken;
    fn add_many(&mut self, offers: Vec<Offer>) -> Vec<OfferToken>;
    fn remove(&mut self, token: &OfferToken) -> Result<Offer, Self::Error>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn depth(&self) -> (Amount, Amount);
    fn top(&self) -> (Option<Price>, Option<Price>);
    fn crossed(&self) -> bool;
}
