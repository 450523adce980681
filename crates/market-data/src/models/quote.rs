use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price quote for a single card printing.
///
/// Both the regular and foil prices are carried when the catalogue has them;
/// the caller decides which one applies to a given inventory record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Regular (non-foil) price in USD
    pub usd: Option<Decimal>,

    /// Foil price in USD
    pub usd_foil: Option<Decimal>,

    /// Regular price in EUR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur: Option<Decimal>,

    /// MTGO ticket price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tix: Option<Decimal>,

    /// Catalogue metadata for the matched printing
    pub metadata: CardMetadata,

    /// When the quote was fetched
    pub fetched_at: DateTime<Utc>,

    /// Source of the quote (SCRYFALL, ...)
    pub source: String,
}

impl PriceQuote {
    /// Create a quote with only the USD prices set
    pub fn new(usd: Option<Decimal>, usd_foil: Option<Decimal>, source: String) -> Self {
        Self {
            usd,
            usd_foil,
            eur: None,
            tix: None,
            metadata: CardMetadata::default(),
            fetched_at: Utc::now(),
            source,
        }
    }

    pub fn has_usd_price(&self) -> bool {
        self.usd.is_some() || self.usd_foil.is_some()
    }

    /// Pick the price matching the foil flag, see [`PriceSelection::choose`].
    pub fn select(&self, is_foil: bool) -> Option<PriceSelection> {
        PriceSelection::choose(self.usd, self.usd_foil, is_foil)
    }
}

/// Catalogue metadata returned alongside a price.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMetadata {
    /// Canonical card name as known by the catalogue
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
    /// Rarity, title-cased ("Common", "Mythic")
    pub rarity: Option<String>,
    pub mana_cost: Option<String>,
    pub mana_value: Option<Decimal>,
    pub type_line: Option<String>,
    pub colors: ColorCategory,
    pub market_url: Option<String>,
    pub image_url: Option<String>,
}

/// Colour grouping used for inventory display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCategory {
    #[default]
    Colorless,
    White,
    Blue,
    Black,
    Red,
    Green,
    Multicolor,
    Other,
}

impl ColorCategory {
    /// Derive the category from catalogue colour symbols ("W", "U", ...).
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Self {
        match symbols {
            [] => ColorCategory::Colorless,
            [single] => match single.as_ref() {
                "W" => ColorCategory::White,
                "U" => ColorCategory::Blue,
                "B" => ColorCategory::Black,
                "R" => ColorCategory::Red,
                "G" => ColorCategory::Green,
                _ => ColorCategory::Other,
            },
            _ => ColorCategory::Multicolor,
        }
    }
}

/// Which of the two catalogue prices was used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceVariant {
    Regular,
    Foil,
}

/// Outcome of choosing a price for a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSelection {
    pub price: Decimal,
    pub variant: PriceVariant,
    /// True when the requested variant had no price and the other one was used
    pub fallback: bool,
}

impl PriceSelection {
    /// Choose the active price for a card.
    ///
    /// The variant matching `is_foil` wins when present. When it is absent
    /// but the other variant is priced, the other price is used and the
    /// selection is flagged as a fallback. Returns `None` when neither price
    /// is available.
    pub fn choose(usd: Option<Decimal>, usd_foil: Option<Decimal>, is_foil: bool) -> Option<Self> {
        let (wanted, wanted_variant, other, other_variant) = if is_foil {
            (usd_foil, PriceVariant::Foil, usd, PriceVariant::Regular)
        } else {
            (usd, PriceVariant::Regular, usd_foil, PriceVariant::Foil)
        };

        match (wanted, other) {
            (Some(price), _) => Some(Self {
                price,
                variant: wanted_variant,
                fallback: false,
            }),
            (None, Some(price)) => Some(Self {
                price,
                variant: other_variant,
                fallback: true,
            }),
            (None, None) => None,
        }
    }
}
