pub mod system_clock;

use std::time::Instant;

use chrono::{DateTime, Utc};

/// One reading of the clock. `wall` drives calendar decisions, `monotonic`
/// measures elapsed time and never steps backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub wall: DateTime<Utc>,
    pub monotonic: Instant,
}

/// Source of time for the watch loop.
pub trait Clock: Send + Sync {
    fn now(&self) -> Moment;

    fn name(&self) -> &str {
        "Clock"
    }
}
