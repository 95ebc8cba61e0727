use async_trait::async_trait;
use thiserror::Error;

use crate::types::{price::Price, symbol::Symbol};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("price request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("price source returned http {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode quote: {0}")]
    Decode(String),

    #[error("invalid quote for {symbol}: {raw}")]
    InvalidQuote { symbol: Symbol, raw: String },
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &Symbol) -> Result<Price, FetchError>;
}
