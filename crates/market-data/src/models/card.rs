use serde::{Deserialize, Serialize};

/// Identity of a card printing in the external pricing catalogue.
///
/// A card is looked up by name, optionally narrowed to a set and a
/// collector number. The foil/non-foil variant is not part of the lookup:
/// a single catalogue entry carries both prices.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLookup {
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
}

impl CardLookup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_code: None,
            collector_number: None,
        }
    }

    pub fn with_set(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = non_blank(set_code.into());
        self
    }

    pub fn with_collector_number(mut self, collector_number: impl Into<String>) -> Self {
        self.collector_number = non_blank(collector_number.into());
        self
    }

    /// Lowercased set code, as the catalogue expects it in URLs.
    pub fn set_code_lower(&self) -> Option<String> {
        self.set_code.as_ref().map(|s| s.trim().to_lowercase())
    }

    /// Stable key used by the price cache.
    ///
    /// Case and surrounding whitespace are ignored so that the same printing
    /// entered twice with different capitalization shares one cache entry.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.name.trim().to_lowercase(),
            self.set_code_lower().unwrap_or_default(),
            self.collector_number
                .as_deref()
                .map(|n| n.trim().to_lowercase())
                .unwrap_or_default()
        )
    }
}

impl std::fmt::Display for CardLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(set) = &self.set_code {
            write!(f, " [{}", set.to_uppercase())?;
            if let Some(number) = &self.collector_number {
                write!(f, " #{}", number)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
