use async_trait::async_trait;
use tracing::info;

use crate::notify::{DeliveryError, Notifier};

/// Dry-run notifier: every message goes to the log instead of a chat.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        info!(%text, "notification (dry run)");

        Ok(())
    }
}
