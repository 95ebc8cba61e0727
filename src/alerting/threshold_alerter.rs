use std::time::{Duration, Instant};

use anyhow::{Result, bail};

use crate::alerting::alert_decision::{Alert, AlertDecision, Direction, HoldReason};
use crate::alerting::messages;
use crate::types::{price::Price, symbol::Symbol};

/// Step-quantized move detector.
///
/// An alert fires once the price is at least one whole `threshold_step` away
/// from the anchor. The anchor then advances by whole steps only, so any
/// partial step is carried into the next evaluation.
///
/// The minimum gap between alerts is measured on the monotonic clock.
#[derive(Debug, Clone)]
pub struct ThresholdAlerter {
    symbol: Symbol,
    threshold_step: f64,
    min_gap: Duration,
}

impl ThresholdAlerter {
    pub fn new(symbol: Symbol, threshold_step: f64, min_gap: Duration) -> Result<Self> {
        if !threshold_step.is_finite() || threshold_step <= 0.0 {
            bail!("threshold step must be > 0, got {threshold_step}");
        }

        Ok(Self {
            symbol,
            threshold_step,
            min_gap,
        })
    }

    pub fn threshold_step(&self) -> f64 {
        self.threshold_step
    }

    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    pub fn evaluate(
        &self,
        current: Price,
        anchor: Price,
        last_alert: Option<Instant>,
        now: Instant,
    ) -> AlertDecision {
        /* A last alert later than `now` cannot be measured; treat the gap as elapsed. */
        if let Some(since_last_alert) = last_alert.and_then(|last| now.checked_duration_since(last))
        {
            if since_last_alert < self.min_gap {
                return AlertDecision::Hold(HoldReason::TooSoon { since_last_alert });
            }
        }

        let diff = current - anchor;
        if diff.abs() < self.threshold_step {
            return AlertDecision::Hold(HoldReason::BelowThreshold { diff });
        }

        let steps = (diff.abs() / self.threshold_step).floor();
        let direction = if diff > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        let moved = self.threshold_step * steps;

        AlertDecision::Alert(Alert {
            price: current,
            direction,
            steps: steps as u64,
            new_anchor: anchor + moved * direction.sign(),
            message: messages::price_alert(&self.symbol, current, direction, moved),
        })
    }
}
