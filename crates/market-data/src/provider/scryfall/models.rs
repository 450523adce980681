//! Scryfall API response models.
//!
//! Scryfall returns prices as decimal strings (or `null` when a printing
//! has no market for that variant), which is why the price fields are
//! kept as `Option<String>` here and parsed into `Decimal` on conversion.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::models::{CardMetadata, ColorCategory, PriceQuote};

/// Card object returned by `/cards/named` and `/cards/{set}/{number}`
#[derive(Debug, Deserialize)]
pub struct ScryfallCard {
    pub name: String,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub collector_number: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub prices: ScryfallPrices,
    #[serde(default)]
    pub purchase_uris: Option<ScryfallPurchaseUris>,
    #[serde(default)]
    pub image_uris: Option<ScryfallImageUris>,
    // Note: card_faces, legalities, oracle_text exist but are not used for pricing
}

/// Price block of a card object
#[derive(Debug, Default, Deserialize)]
pub struct ScryfallPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub eur: Option<String>,
    pub tix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScryfallPurchaseUris {
    pub tcgplayer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScryfallImageUris {
    pub normal: Option<String>,
}

/// Error object returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ScryfallError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ScryfallCard {
    pub fn into_quote(self, source: &str) -> PriceQuote {
        let metadata = CardMetadata {
            name: self.name.clone(),
            set_code: self.set,
            collector_number: self.collector_number,
            rarity: self.rarity.as_deref().map(title_case),
            mana_cost: self.mana_cost.filter(|s| !s.is_empty()),
            mana_value: self.cmc.and_then(Decimal::from_f64),
            type_line: self.type_line,
            colors: ColorCategory::from_symbols(&self.colors),
            market_url: self.purchase_uris.and_then(|u| u.tcgplayer),
            image_url: self.image_uris.and_then(|u| u.normal),
        };

        PriceQuote {
            usd: parse_price(self.prices.usd.as_deref(), &self.name),
            usd_foil: parse_price(self.prices.usd_foil.as_deref(), &self.name),
            eur: parse_price(self.prices.eur.as_deref(), &self.name),
            tix: parse_price(self.prices.tix.as_deref(), &self.name),
            metadata,
            fetched_at: Utc::now(),
            source: source.to_string(),
        }
    }
}

/// Parse a catalogue price string. Unparseable or negative values count as absent.
fn parse_price(raw: Option<&str>, card_name: &str) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match Decimal::from_str(raw) {
        Ok(price) if price.is_sign_negative() => {
            warn!("Ignoring negative price '{}' for {}", raw, card_name);
            None
        }
        Ok(price) => Some(price),
        Err(e) => {
            warn!("Ignoring unparseable price '{}' for {}: {}", raw, card_name, e);
            None
        }
    }
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
