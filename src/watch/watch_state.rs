use std::time::Instant;

use crate::types::price::Price;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchPhase {
    #[default]
    Startup,
    Watching,
    Idle,
}

/// Everything the watch loop remembers between ticks. Memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchState {
    pub anchor: Option<Price>,
    /// Monotonic time of the last alert. `None` until the first one; the
    /// rate limit never blocks in that case.
    pub last_alert: Option<Instant>,
    pub session_open: bool,
    pub phase: WatchPhase,
}
