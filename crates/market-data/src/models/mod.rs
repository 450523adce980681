//! Market data models
//!
//! This module contains the core data types for price fetching:
//! - `card` - Catalogue identity of a card printing (CardLookup)
//! - `quote` - Price quote data (PriceQuote, CardMetadata) and foil/regular selection

mod card;
mod quote;

pub use card::CardLookup;
pub use quote::{CardMetadata, ColorCategory, PriceQuote, PriceSelection, PriceVariant};
