use crate::alerting::alert_decision::{Direction, HoldReason};
use crate::types::price::Price;

#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Started {
        price: Option<Price>,
    },
    SessionOpened {
        price: Price,
    },
    SessionClosed,
    OutOfSession,
    AnchorSet {
        price: Price,
    },
    Held(HoldReason),
    Alerted {
        price: Price,
        direction: Direction,
        steps: u64,
        new_anchor: Price,
        delivered: bool,
    },
    FetchFailed {
        error: String,
    },
    DeliveryFailed {
        error: String,
    },
}
