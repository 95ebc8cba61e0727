use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;

/// What happens to the anchor when an alert fired but could not be delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CommitPolicy {
    /// Advance anchor and alert time whether or not the send succeeded.
    #[default]
    Always,
    /// Keep the old anchor on a failed send so the move alerts again next tick.
    #[clap(name = "on-delivery")]
    OnDelivery,
}

impl CommitPolicy {
    pub fn should_commit(self, delivered: bool) -> bool {
        match self {
            Self::Always => true,
            Self::OnDelivery => delivered,
        }
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::OnDelivery => write!(f, "on-delivery"),
        }
    }
}

impl FromStr for CommitPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(Self::Always),
            "on-delivery" | "on_delivery" => Ok(Self::OnDelivery),
            other => Err(anyhow!("unknown commit policy: {other}")),
        }
    }
}
