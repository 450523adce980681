//! Scryfall price source implementation.
//!
//! This module fetches card prices from the Scryfall API:
//! - Exact printing via /cards/{set}/{collector_number}
//! - Name search via /cards/named?fuzzy=...
//!
//! When a set code and collector number are known the exact printing is
//! tried first and accepted only if its name matches the requested one.
//! Otherwise (or on a miss) the fuzzy name search is used, narrowed to the
//! set when one is given.
//!
//! Scryfall asks for 50-100 ms between requests and requires a User-Agent.
//! API documentation: https://scryfall.com/docs/api

mod models;
mod name_match;

pub use name_match::names_match;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use self::models::{ScryfallCard, ScryfallError};
use crate::errors::{FetchClass, MarketDataError};
use crate::models::{CardLookup, PriceQuote};
use crate::provider::{PriceSource, RateLimit};
use crate::registry::RequestPacer;

const BASE_URL: &str = "https://api.scryfall.com";
const PROVIDER_ID: &str = "SCRYFALL";
const USER_AGENT: &str = concat!("CardVault/", env!("CARGO_PKG_VERSION"));

/// Scryfall price source.
///
/// Free, keyless API covering every Magic: The Gathering printing with
/// daily-updated USD, USD foil, EUR and MTGO ticket prices.
pub struct ScryfallProvider {
    client: Client,
    base_url: String,
    rate_limit: RateLimit,
}

impl ScryfallProvider {
    /// Create a provider against the public Scryfall API.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Create a provider against a custom endpoint (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, RateLimit::default())
    }

    pub fn with_config(base_url: impl Into<String>, rate_limit: RateLimit) -> Self {
        let client = Client::builder()
            .timeout(rate_limit.call_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limit,
        }
    }

    /// Fetch the exact printing by set code and collector number.
    async fn fetch_printing(
        &self,
        set_code: &str,
        collector_number: &str,
        lookup: &CardLookup,
        pacer: &RequestPacer<'_>,
    ) -> Result<ScryfallCard, MarketDataError> {
        let url = format!(
            "{}/cards/{}/{}",
            self.base_url,
            urlencoding::encode(set_code),
            urlencoding::encode(collector_number.trim())
        );
        self.get_card(self.client.get(&url), lookup, pacer).await
    }

    /// Fetch by fuzzy name, optionally narrowed to a set.
    async fn fetch_named(
        &self,
        lookup: &CardLookup,
        pacer: &RequestPacer<'_>,
    ) -> Result<ScryfallCard, MarketDataError> {
        let url = format!("{}/cards/named", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("fuzzy", lookup.name.trim()), ("format", "json")]);
        if let Some(set) = lookup.set_code_lower() {
            request = request.query(&[("set", set.as_str())]);
        }
        self.get_card(request, lookup, pacer).await
    }

    async fn get_card(
        &self,
        request: reqwest::RequestBuilder,
        lookup: &CardLookup,
        pacer: &RequestPacer<'_>,
    ) -> Result<ScryfallCard, MarketDataError> {
        pacer.ready().await;
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, lookup));
        }

        response
            .json::<ScryfallCard>()
            .await
            .map_err(|e| MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to decode card: {}", e),
            })
    }
}

impl Default for ScryfallProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for ScryfallProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn fetch_price(
        &self,
        lookup: &CardLookup,
        pacer: &RequestPacer<'_>,
    ) -> Result<PriceQuote, MarketDataError> {
        if let (Some(set), Some(number)) = (lookup.set_code_lower(), lookup.collector_number.as_deref()) {
            match self.fetch_printing(&set, number, lookup, pacer).await {
                Ok(card) if names_match(&lookup.name, &card.name) => {
                    debug!("Scryfall printing match for {}", lookup);
                    return Ok(card.into_quote(PROVIDER_ID));
                }
                Ok(card) => {
                    warn!(
                        "Collector number match found but name mismatch: '{}' vs '{}'",
                        lookup.name, card.name
                    );
                }
                Err(e) if e.fetch_class() == FetchClass::NotFound => {
                    debug!("No printing {} #{} for {}", set, number, lookup.name);
                }
                Err(e) => return Err(e),
            }
        }

        let card = self.fetch_named(lookup, pacer).await?;
        debug!("Scryfall name match for {}: {}", lookup, card.name);
        Ok(card.into_quote(PROVIDER_ID))
    }
}

fn map_request_error(e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        MarketDataError::Network(e)
    }
}

fn map_status(status: StatusCode, body: &str, lookup: &CardLookup) -> MarketDataError {
    let details = serde_json::from_str::<ScryfallError>(body)
        .ok()
        .and_then(|err| err.details.or(err.code))
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::NOT_FOUND => MarketDataError::CardNotFound(lookup.to_string()),
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MarketDataError::Unauthorized {
            provider: PROVIDER_ID.to_string(),
            message: details,
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            MarketDataError::BadRequest {
                provider: PROVIDER_ID.to_string(),
                message: details,
            }
        }
        s if s.is_server_error() => MarketDataError::ServerError {
            provider: PROVIDER_ID.to_string(),
            status: s.as_u16(),
        },
        _ => MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: details,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RateLimitedFetcher, RateLimiter};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card_json(name: &str, usd: Option<&str>, usd_foil: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "object": "card",
            "name": name,
            "set": "m10",
            "collector_number": "146",
            "rarity": "common",
            "colors": ["R"],
            "prices": { "usd": usd, "usd_foil": usd_foil, "eur": null, "tix": null }
        })
    }

    fn not_found_json() -> serde_json::Value {
        serde_json::json!({
            "object": "error",
            "code": "not_found",
            "status": 404,
            "details": "No card found with the given name."
        })
    }

    async fn fetch(
        provider: &ScryfallProvider,
        lookup: &CardLookup,
    ) -> Result<PriceQuote, MarketDataError> {
        let limiter = RateLimiter::with_spacing(Duration::ZERO);
        provider.fetch_price(lookup, &RequestPacer::new(&limiter)).await
    }

    #[test]
    fn test_provider_id() {
        let provider = ScryfallProvider::new();
        assert_eq!(provider.id(), "SCRYFALL");
        assert_eq!(provider.rate_limit(), RateLimit::default());
    }

    #[tokio::test]
    async fn test_fetch_by_printing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/m10/146"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(card_json(
                    "Lightning Bolt",
                    Some("1.89"),
                    Some("7.50"),
                )),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = ScryfallProvider::with_base_url(server.uri());
        let lookup = CardLookup::new("Lightning Bolt")
            .with_set("M10")
            .with_collector_number("146");
        let quote = fetch(&provider, &lookup).await.unwrap();

        assert_eq!(quote.usd, Some(dec!(1.89)));
        assert_eq!(quote.usd_foil, Some(dec!(7.50)));
    }

    #[tokio::test]
    async fn test_printing_name_mismatch_falls_back_to_named() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/m10/146"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(card_json("Shock", Some("0.10"), None)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .and(query_param("fuzzy", "Lightning Bolt"))
            .and(query_param("set", "m10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(card_json(
                "Lightning Bolt",
                Some("1.89"),
                None,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ScryfallProvider::with_base_url(server.uri());
        let lookup = CardLookup::new("Lightning Bolt")
            .with_set("m10")
            .with_collector_number("146");
        let quote = fetch(&provider, &lookup).await.unwrap();

        assert_eq!(quote.metadata.name, "Lightning Bolt");
        assert_eq!(quote.usd, Some(dec!(1.89)));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_card_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_json()))
            .mount(&server)
            .await;

        let provider = ScryfallProvider::with_base_url(server.uri());
        let err = fetch(&provider, &CardLookup::new("Definitely Not A Card"))
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::CardNotFound(_)));
        assert_eq!(err.fetch_class(), FetchClass::NotFound);
    }

    #[tokio::test]
    async fn test_status_classification() {
        let cases = [
            (503, FetchClass::Transient),
            (429, FetchClass::Transient),
            (401, FetchClass::Fatal),
            (403, FetchClass::Fatal),
            (400, FetchClass::Fatal),
            (422, FetchClass::Fatal),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/cards/named"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let provider = ScryfallProvider::with_base_url(server.uri());
            let err = fetch(&provider, &CardLookup::new("Opt")).await.unwrap_err();
            assert_eq!(err.fetch_class(), expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_transient_printing_failure_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/m10/146"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .respond_with(ResponseTemplate::new(200).set_body_json(card_json(
                "Lightning Bolt",
                Some("1.89"),
                None,
            )))
            .expect(0)
            .mount(&server)
            .await;

        let provider = ScryfallProvider::with_base_url(server.uri());
        let lookup = CardLookup::new("Lightning Bolt")
            .with_set("m10")
            .with_collector_number("146");
        let err = fetch(&provider, &lookup).await.unwrap_err();
        assert!(matches!(
            err,
            MarketDataError::ServerError { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let provider = ScryfallProvider::with_base_url(server.uri());
        let err = fetch(&provider, &CardLookup::new("Opt")).await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidResponse { .. }));
        assert_eq!(err.fetch_class(), FetchClass::Transient);
    }

    #[tokio::test]
    async fn test_name_fallback_waits_for_its_own_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/m10/146"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards/named"))
            .respond_with(ResponseTemplate::new(200).set_body_json(card_json(
                "Lightning Bolt",
                Some("1.89"),
                None,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let spacing = Duration::from_millis(300);
        let provider = ScryfallProvider::with_config(
            server.uri(),
            RateLimit::new(spacing, Duration::from_secs(5)),
        );
        let fetcher = RateLimitedFetcher::new(Arc::new(provider));
        let lookup = CardLookup::new("Lightning Bolt")
            .with_set("m10")
            .with_collector_number("146");

        let start = tokio::time::Instant::now();
        let quote = fetcher.fetch_price(&lookup).await.unwrap();

        assert_eq!(quote.usd, Some(dec!(1.89)));
        // The first request starts at once, the fallback one spacing later
        assert!(start.elapsed() >= spacing);
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(2));
    }
}
