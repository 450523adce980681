//! Card pricing domain models.

use cardvault_market_data::CardLookup;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::{Error, Result};

/// The pricing-relevant view of an inventory card.
///
/// The card itself is owned by the inventory; the engine reads its identity
/// and writes back prices, the derived valuation and alert state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPriceRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
    pub is_foil: bool,
    pub quantity: i32,
    pub purchase_price: Option<Decimal>,
    /// Catalogue price of the regular printing.
    pub current_price: Option<Decimal>,
    /// Catalogue price of the foil printing.
    pub current_price_foil: Option<Decimal>,
    /// Price that applies to this card's variant, used for valuation and alerts.
    pub market_price: Option<Decimal>,
    /// Set when `market_price` came from the other variant.
    pub price_fallback: bool,
    /// Per-card alert threshold in percent; `None` uses the default, zero disables.
    pub alert_threshold_pct: Option<Decimal>,
    pub last_price_update: Option<DateTime<Utc>>,
    pub total_value: Option<Decimal>,
    pub price_change: Option<Decimal>,
}

impl CardPriceRecord {
    /// Catalogue identity of this card.
    pub fn lookup(&self) -> CardLookup {
        let mut lookup = CardLookup::new(self.name.clone());
        if let Some(set) = &self.set_code {
            lookup = lookup.with_set(set.clone());
        }
        if let Some(number) = &self.collector_number {
            lookup = lookup.with_collector_number(number.clone());
        }
        lookup
    }

    /// Whether the periodic monitor should watch this card.
    pub fn alerts_enabled(&self) -> bool {
        self.alert_threshold_pct
            .map(|pct| pct > Decimal::ZERO)
            .unwrap_or(true)
    }
}

/// A card as handed over by the inventory for storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
    pub is_foil: bool,
    pub quantity: i32,
    pub purchase_price: Option<Decimal>,
    pub alert_threshold_pct: Option<Decimal>,
}

impl NewCard {
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "ownerId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.quantity < 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "quantity must not be negative, got {}",
                self.quantity
            ))));
        }
        if self
            .alert_threshold_pct
            .is_some_and(|pct| pct.is_sign_negative())
        {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "alert threshold must not be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// Result of a successful price fetch, written back to the card.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub card_id: String,
    pub price: Option<Decimal>,
    pub price_foil: Option<Decimal>,
    pub market_price: Decimal,
    pub price_fallback: bool,
    pub updated_at: DateTime<Utc>,
}

impl PriceUpdate {
    /// `market_price * quantity`
    pub fn total_value(&self, quantity: i32) -> Decimal {
        self.market_price * Decimal::from(quantity)
    }

    /// `market_price - purchase_price`, absent without a purchase price.
    pub fn price_change(&self, purchase_price: Option<Decimal>) -> Option<Decimal> {
        purchase_price.map(|paid| self.market_price - paid)
    }
}

/// Per-card alert bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    pub card_id: String,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub threshold_pct: Option<Decimal>,
}

/// Direction of a price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Up,
    Down,
}

impl AlertDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertDirection::Up => "up",
            AlertDirection::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(AlertDirection::Up),
            "down" => Some(AlertDirection::Down),
            _ => None,
        }
    }
}

/// A persisted price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub card_id: String,
    pub owner_id: String,
    pub card_name: String,
    pub alert_type: String,
    pub threshold_value: Decimal,
    pub previous_value: Decimal,
    pub current_value: Decimal,
    pub change_pct: Decimal,
    pub direction: AlertDirection,
    pub is_read: bool,
    pub triggered_at: DateTime<Utc>,
}

/// An alert about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceAlert {
    pub card_id: String,
    pub owner_id: String,
    pub card_name: String,
    pub alert_type: String,
    pub threshold_value: Decimal,
    pub previous_value: Decimal,
    pub current_value: Decimal,
    pub change_pct: Decimal,
    pub direction: AlertDirection,
    pub triggered_at: DateTime<Utc>,
}
