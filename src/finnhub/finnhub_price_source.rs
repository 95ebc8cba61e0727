use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::finnhub::finnhub_config::FinnhubConfig;
use crate::market::price_source::{FetchError, PriceSource};
use crate::types::{price::Price, symbol::Symbol};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct FinnhubPriceSource {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinnhubPriceSource {
    pub fn new(config: FinnhubConfig) -> Result<Self, FetchError> {
        Self::with_base_url(config, "https://finnhub.io")
    }

    pub fn with_base_url(
        config: FinnhubConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: config.token,
        })
    }
}

#[async_trait]
impl PriceSource for FinnhubPriceSource {
    async fn fetch(&self, symbol: &Symbol) -> Result<Price, FetchError> {
        let resp = self
            .http
            .get(format!("{}/api/v1/quote", self.base_url))
            .query(&[("symbol", symbol.as_str()), ("token", self.token.as_str())])
            .send()
            .await
            .map_err(|error| FetchError::Transport(error.without_url()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|error| FetchError::Transport(error.without_url()))?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: text });
        }

        parse_quote(symbol, &text)
    }
}

/* Finnhub quote body: {"c": current, "h": high, "l": low, "o": open, "pc": previous close, ...} */
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "c")]
    current: Option<f64>,
}

fn parse_quote(symbol: &Symbol, text: &str) -> Result<Price, FetchError> {
    let quote: QuoteResponse =
        serde_json::from_str(text).map_err(|error| FetchError::Decode(error.to_string()))?;

    quote
        .current
        .and_then(Price::from_quote)
        .ok_or_else(|| FetchError::InvalidQuote {
            symbol: symbol.clone(),
            raw: text.to_string(),
        })
}
