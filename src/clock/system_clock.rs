use std::time::Instant;

use chrono::Utc;

use crate::clock::{Clock, Moment};

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment {
            wall: Utc::now(),
            monotonic: Instant::now(),
        }
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
