//! Cards module - pricing view of inventory cards and the store trait.

mod cards_model;
mod cards_traits;

pub use cards_model::{
    AlertDirection, AlertState, CardPriceRecord, NewCard, NewPriceAlert, PriceAlert, PriceUpdate,
};
pub use cards_traits::CardStore;
