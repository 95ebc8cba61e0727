pub mod log_notifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notifier returned http {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Delivery channel for human-facing alerts. A failed send is reported once
/// and never retried by the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
