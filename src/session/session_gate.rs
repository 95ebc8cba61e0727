use chrono::{DateTime, Datelike, Utc, Weekday};

use crate::types::trading_hours::TradingHours;

/// Decides whether the market is in its regular session.
///
/// Weekends are closed and the session is the half-open interval
/// `[open, close)` in the market timezone. Exchange holidays are not
/// modelled, so the gate reports open on a weekday holiday.
#[derive(Debug, Clone)]
pub struct SessionGate {
    trading_hours: TradingHours,
}

impl SessionGate {
    pub fn new(trading_hours: TradingHours) -> Self {
        Self { trading_hours }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.trading_hours.timezone);

        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let time = local.time();
        time >= self.trading_hours.open && time < self.trading_hours.close
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(TradingHours::default())
    }
}
