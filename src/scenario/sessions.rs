use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SessionMode {
    /// Watch only during regular trading hours
    Market,
    /// Watch around the clock
    #[clap(name = "always-on")]
    AlwaysOn,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::AlwaysOn => write!(f, "always-on"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "market" => Ok(Self::Market),
            "always-on" | "always" | "24/7" => Ok(Self::AlwaysOn),
            other => Err(anyhow!("unknown session mode: {other}")),
        }
    }
}
