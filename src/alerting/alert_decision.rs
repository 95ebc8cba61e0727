use std::fmt;

use std::time::Duration;

use crate::types::price::Price;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Self::Up => "📈",
            Self::Down => "📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub price: Price,
    pub direction: Direction,
    /// Whole threshold steps crossed since the anchor, always >= 1
    pub steps: u64,
    pub new_anchor: Price,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldReason {
    TooSoon { since_last_alert: Duration },
    BelowThreshold { diff: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    Alert(Alert),
    Hold(HoldReason),
}
