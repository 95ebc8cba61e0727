pub mod finnhub_config;
pub mod finnhub_price_source;
