use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    #[clap(name = "dry-run")]
    DryRun,
    Telegram,
}

impl fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry-run"),
            Self::Telegram => write!(f, "telegram"),
        }
    }
}

impl FromStr for NotifierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dry-run" | "dryrun" | "log" => Ok(Self::DryRun),
            "telegram" => Ok(Self::Telegram),
            other => Err(anyhow!("unknown notifier kind: {other}")),
        }
    }
}
