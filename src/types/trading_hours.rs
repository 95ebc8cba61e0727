use anyhow::{Result, anyhow, bail};
use chrono::NaiveTime;
use chrono_tz::Tz;

/// Regular session of the watched market, expressed in the market's own
/// timezone so daylight saving shifts follow the tz database.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TradingHours {
    /// Session open (inclusive)
    pub open: NaiveTime,

    /// Session close (exclusive)
    pub close: NaiveTime,

    pub timezone: Tz,
}

impl TradingHours {
    pub fn new(timezone: Tz, open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open >= close {
            bail!("market open {open} must be before market close {close}");
        }

        Ok(Self {
            open,
            close,
            timezone,
        })
    }

    pub fn parse(timezone: &str, open: &str, close: &str) -> Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|error| anyhow!("unknown market timezone {timezone:?}: {error}"))?;

        Self::new(timezone, parse_time(open)?, parse_time(close)?)
    }
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            timezone: chrono_tz::America::New_York,
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|error| anyhow!("invalid session time {raw:?}, expected HH:MM: {error}"))
}
