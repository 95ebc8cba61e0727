use std::time::Duration;

use tracing::{debug, info, warn};

use crate::alerting::alert_decision::AlertDecision;
use crate::alerting::messages;
use crate::alerting::threshold_alerter::ThresholdAlerter;
use crate::clock::{Clock, Moment, system_clock::SystemClock};
use crate::events::WatchEvent;
use crate::market::price_source::PriceSource;
use crate::notify::Notifier;
use crate::session::session_gate::SessionGate;
use crate::types::{price::Price, symbol::Symbol};
use crate::watch::commit_policy::CommitPolicy;
use crate::watch::watch_state::{WatchPhase, WatchState};

pub type DynamicPriceSource = Box<dyn PriceSource>;
pub type DynamicNotifier = Box<dyn Notifier>;

/// Result of one step of the loop: the state to carry into the next tick and
/// what happened along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: WatchState,
    pub events: Vec<WatchEvent>,
}

pub struct WatchLoop {
    symbol: Symbol,
    alerter: ThresholdAlerter,
    session_gate: Option<SessionGate>,
    price_source: DynamicPriceSource,
    notifier: DynamicNotifier,
    clock: Box<dyn Clock>,
    poll_interval: Duration,
    commit_policy: CommitPolicy,
}

impl WatchLoop {
    pub fn new(
        symbol: Symbol,
        alerter: ThresholdAlerter,
        price_source: DynamicPriceSource,
        notifier: DynamicNotifier,
    ) -> Self {
        Self {
            symbol,
            alerter,
            session_gate: None,
            price_source,
            notifier,
            clock: Box::new(SystemClock),
            poll_interval: Duration::from_secs(30),
            commit_policy: CommitPolicy::default(),
        }
    }

    /// Without a gate the loop watches around the clock.
    pub fn with_session_gate(mut self, session_gate: SessionGate) -> Self {
        self.session_gate = Some(session_gate);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_commit_policy(mut self, commit_policy: CommitPolicy) -> Self {
        self.commit_policy = commit_policy;
        self
    }

    /// Runs until the process is stopped.
    pub async fn run(&self) {
        info!(
            symbol = %self.symbol,
            threshold = self.alerter.threshold_step(),
            poll_seconds = self.poll_interval.as_secs(),
            min_gap_seconds = self.alerter.min_gap().as_secs(),
            gated = self.session_gate.is_some(),
            commit_policy = %self.commit_policy,
            clock = self.clock.name(),
            "starting price watch"
        );

        let mut state = self.startup(self.clock.now()).await.state;

        loop {
            tokio::time::sleep(self.poll_interval).await;
            state = self.tick(state, self.clock.now()).await.state;
        }
    }

    pub async fn startup(&self, now: Moment) -> TickOutcome {
        let mut state = WatchState::default();
        let mut events = Vec::new();

        let open_now = self.is_session_open(now);
        let price = if open_now {
            self.fetch_price(&mut events).await
        } else {
            None
        };

        self.deliver(
            &messages::startup(&self.symbol, price, self.alerter.threshold_step()),
            &mut events,
        )
        .await;
        events.push(WatchEvent::Started { price });

        if let Some(price) = price {
            state.anchor = Some(price);
            events.push(WatchEvent::AnchorSet { price });
        }

        /* Gated startup only counts as open once the anchor exists, so a failed
        first fetch turns into a regular OPEN transition on the next tick. */
        state.session_open = match self.session_gate {
            Some(_) => price.is_some(),
            None => true,
        };
        state.phase = if state.session_open {
            WatchPhase::Watching
        } else {
            WatchPhase::Idle
        };

        info!(symbol = %self.symbol, phase = ?state.phase, anchor = ?state.anchor, "watch started");

        TickOutcome { state, events }
    }

    pub async fn tick(&self, state: WatchState, now: Moment) -> TickOutcome {
        let mut next = state;
        let mut events = Vec::new();
        let open_now = self.is_session_open(now);

        if open_now && !state.session_open {
            let Some(price) = self.fetch_price(&mut events).await else {
                return TickOutcome { state, events };
            };

            info!(symbol = %self.symbol, %price, "market open");
            self.deliver(&messages::market_open(&self.symbol, price), &mut events)
                .await;

            next.anchor = Some(price);
            next.last_alert = None;
            next.session_open = true;
            next.phase = WatchPhase::Watching;
            events.push(WatchEvent::SessionOpened { price });

            return TickOutcome {
                state: next,
                events,
            };
        }

        if !open_now && state.session_open {
            info!(symbol = %self.symbol, "market closed");
            self.deliver(&messages::market_close(&self.symbol), &mut events)
                .await;

            next.session_open = false;
            next.phase = WatchPhase::Idle;
            events.push(WatchEvent::SessionClosed);

            return TickOutcome {
                state: next,
                events,
            };
        }

        if !open_now {
            events.push(WatchEvent::OutOfSession);

            return TickOutcome { state, events };
        }

        let Some(price) = self.fetch_price(&mut events).await else {
            return TickOutcome { state, events };
        };

        let Some(anchor) = state.anchor else {
            debug!(symbol = %self.symbol, %price, "anchor established");
            next.anchor = Some(price);
            events.push(WatchEvent::AnchorSet { price });

            return TickOutcome {
                state: next,
                events,
            };
        };

        match self.alerter.evaluate(price, anchor, state.last_alert, now.monotonic) {
            AlertDecision::Hold(reason) => {
                debug!(symbol = %self.symbol, %price, %anchor, ?reason, "holding");
                events.push(WatchEvent::Held(reason));
            }
            AlertDecision::Alert(alert) => {
                info!(
                    symbol = %self.symbol,
                    price = alert.price.as_f64(),
                    anchor = anchor.as_f64(),
                    new_anchor = alert.new_anchor.as_f64(),
                    steps = alert.steps,
                    direction = %alert.direction,
                    "threshold crossed"
                );

                let delivered = self.deliver(&alert.message, &mut events).await;

                if self.commit_policy.should_commit(delivered) {
                    next.anchor = Some(alert.new_anchor);
                    next.last_alert = Some(now.monotonic);
                } else {
                    warn!(symbol = %self.symbol, %anchor, "alert not delivered, keeping anchor");
                }

                events.push(WatchEvent::Alerted {
                    price: alert.price,
                    direction: alert.direction,
                    steps: alert.steps,
                    new_anchor: alert.new_anchor,
                    delivered,
                });
            }
        }

        TickOutcome {
            state: next,
            events,
        }
    }

    fn is_session_open(&self, now: Moment) -> bool {
        self.session_gate
            .as_ref()
            .map_or(true, |gate| gate.is_open(now.wall))
    }

    async fn fetch_price(&self, events: &mut Vec<WatchEvent>) -> Option<Price> {
        match self.price_source.fetch(&self.symbol).await {
            Ok(price) => Some(price),
            Err(error) => {
                warn!(symbol = %self.symbol, %error, "price fetch failed");
                events.push(WatchEvent::FetchFailed {
                    error: error.to_string(),
                });

                None
            }
        }
    }

    async fn deliver(&self, text: &str, events: &mut Vec<WatchEvent>) -> bool {
        match self.notifier.send(text).await {
            Ok(()) => true,
            Err(error) => {
                warn!(symbol = %self.symbol, %error, "notification not delivered");
                events.push(WatchEvent::DeliveryFailed {
                    error: error.to_string(),
                });

                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, OnceLock};
    use std::time::Instant;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::America::New_York;

    use crate::alerting::alert_decision::{Direction, HoldReason};
    use crate::market::price_source::FetchError;
    use crate::notify::DeliveryError;

    #[derive(Clone, Default)]
    struct ScriptedPrices {
        script: Arc<Mutex<VecDeque<Option<f64>>>>,
        calls: Arc<Mutex<usize>>,
    }

    impl ScriptedPrices {
        fn push(&self, price: Option<f64>) {
            self.script.lock().unwrap().push_back(price);
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedPrices {
        async fn fetch(&self, _symbol: &Symbol) -> Result<Price, FetchError> {
            *self.calls.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop_front() {
                Some(Some(price)) => Ok(Price::new(price)),
                Some(None) => Err(FetchError::Decode("scripted failure".to_string())),
                None => panic!("unexpected price fetch"),
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        failing: Arc<Mutex<bool>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), DeliveryError> {
            if *self.failing.lock().unwrap() {
                return Err(DeliveryError::Status {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: "down".to_string(),
                });
            }

            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        prices: ScriptedPrices,
        notifier: RecordingNotifier,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                prices: ScriptedPrices::default(),
                notifier: RecordingNotifier::default(),
            }
        }

        fn watch_loop(&self, min_gap_seconds: u64) -> WatchLoop {
            let symbol = Symbol::parse("ASTS").unwrap();
            let alerter = ThresholdAlerter::new(
                symbol.clone(),
                1.0,
                Duration::from_secs(min_gap_seconds),
            )
            .unwrap();

            WatchLoop::new(
                symbol,
                alerter,
                Box::new(self.prices.clone()),
                Box::new(self.notifier.clone()),
            )
        }

        fn gated_loop(&self) -> WatchLoop {
            self.watch_loop(0).with_session_gate(SessionGate::default())
        }
    }

    fn monotonic(seconds: u64) -> Instant {
        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        *ORIGIN.get_or_init(Instant::now) + Duration::from_secs(seconds)
    }

    fn moment(wall: DateTime<Utc>, seconds: u64) -> Moment {
        Moment {
            wall,
            monotonic: monotonic(seconds),
        }
    }

    fn at(seconds: u64) -> Moment {
        let wall = Utc.timestamp_opt(1_700_000_000 + seconds as i64, 0).unwrap();
        moment(wall, seconds)
    }

    /* 2024-05-15 is a Wednesday */
    fn wednesday(h: u32, m: u32) -> Moment {
        let wall = New_York
            .with_ymd_and_hms(2024, 5, 15, h, m, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        moment(wall, u64::from(h * 3600 + m * 60))
    }

    fn watching(anchor: f64) -> WatchState {
        WatchState {
            anchor: Some(Price::new(anchor)),
            last_alert: None,
            session_open: true,
            phase: WatchPhase::Watching,
        }
    }

    #[tokio::test]
    async fn always_on_startup_announces_and_sets_anchor() {
        let harness = Harness::new();
        harness.prices.push(Some(24.5));

        let outcome = harness.watch_loop(0).startup(at(0)).await;

        assert_eq!(outcome.state.anchor, Some(Price::new(24.5)));
        assert!(outcome.state.session_open);
        assert_eq!(outcome.state.phase, WatchPhase::Watching);

        let sent = harness.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("ASTS"));
        assert!(sent[0].contains("$24.50"));
    }

    #[tokio::test]
    async fn always_on_startup_survives_failed_fetch() {
        let harness = Harness::new();
        harness.prices.push(None);
        harness.prices.push(Some(30.0));
        let watch_loop = harness.watch_loop(0);

        let outcome = watch_loop.startup(at(0)).await;
        assert_eq!(outcome.state.anchor, None);
        assert_eq!(outcome.state.phase, WatchPhase::Watching);
        assert_eq!(harness.notifier.sent().len(), 1);

        let outcome = watch_loop.tick(outcome.state, at(30)).await;
        assert_eq!(outcome.state.anchor, Some(Price::new(30.0)));
        assert_eq!(
            outcome.events,
            vec![WatchEvent::AnchorSet {
                price: Price::new(30.0)
            }]
        );
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn rising_prices_alert_once_per_whole_step() {
        let harness = Harness::new();
        for price in [100.40, 101.20, 102.90] {
            harness.prices.push(Some(price));
        }
        let watch_loop = harness.watch_loop(0);

        let mut state = watching(100.0);
        let mut alerts = Vec::new();
        for tick in 0..3 {
            let outcome = watch_loop.tick(state, at(tick)).await;
            state = outcome.state;
            alerts.extend(outcome.events.into_iter().filter_map(|event| match event {
                WatchEvent::Alerted { new_anchor, .. } => Some((tick, new_anchor)),
                _ => None,
            }));
        }

        assert_eq!(
            alerts,
            vec![(1, Price::new(101.0)), (2, Price::new(102.0))]
        );
        assert_eq!(state.anchor, Some(Price::new(102.0)));
        assert_eq!(state.last_alert, Some(at(2).monotonic));
        assert_eq!(
            harness.notifier.sent(),
            vec![
                "📈 ASTS at $101.20 (+$1.00)".to_string(),
                "📈 ASTS at $102.90 (+$1.00)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn minimum_gap_suppresses_follow_up_alert() {
        let harness = Harness::new();
        harness.prices.push(Some(103.0));
        harness.prices.push(Some(110.0));
        let watch_loop = harness.watch_loop(20);

        let first = watch_loop.tick(watching(100.0), at(0)).await;
        assert_eq!(first.state.anchor, Some(Price::new(103.0)));

        let second = watch_loop.tick(first.state, at(10)).await;
        assert_eq!(second.state, first.state);
        assert_eq!(
            second.events,
            vec![WatchEvent::Held(HoldReason::TooSoon {
                since_last_alert: Duration::from_secs(10)
            })]
        );
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn wall_clock_stepping_back_does_not_hold_alerts() {
        let harness = Harness::new();
        harness.prices.push(Some(103.0));
        harness.prices.push(Some(150.0));
        let watch_loop = harness.watch_loop(20);

        let first = watch_loop.tick(watching(100.0), at(3600)).await;
        assert_eq!(first.state.anchor, Some(Price::new(103.0)));

        let rewound = moment(at(60).wall, 3630);
        let second = watch_loop.tick(first.state, rewound).await;

        assert_eq!(second.state.anchor, Some(Price::new(150.0)));
        assert_eq!(second.state.last_alert, Some(monotonic(3630)));
        assert_eq!(harness.notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_state_untouched() {
        let harness = Harness::new();
        harness.prices.push(None);
        let watch_loop = harness.watch_loop(0);
        let state = watching(100.0);

        let outcome = watch_loop.tick(state, at(0)).await;

        assert_eq!(outcome.state, state);
        assert!(matches!(
            outcome.events.as_slice(),
            [WatchEvent::FetchFailed { .. }]
        ));
        assert!(harness.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_still_advances_anchor_by_default() {
        let harness = Harness::new();
        harness.prices.push(Some(102.5));
        harness.notifier.set_failing(true);
        let watch_loop = harness.watch_loop(0);

        let outcome = watch_loop.tick(watching(100.0), at(5)).await;

        assert_eq!(outcome.state.anchor, Some(Price::new(102.0)));
        assert_eq!(outcome.state.last_alert, Some(at(5).monotonic));
        assert!(outcome.events.contains(&WatchEvent::Alerted {
            price: Price::new(102.5),
            direction: Direction::Up,
            steps: 2,
            new_anchor: Price::new(102.0),
            delivered: false,
        }));
    }

    #[tokio::test]
    async fn on_delivery_policy_realerts_after_failed_send() {
        let harness = Harness::new();
        harness.prices.push(Some(98.7));
        harness.prices.push(Some(98.7));
        harness.notifier.set_failing(true);
        let watch_loop = harness
            .watch_loop(0)
            .with_commit_policy(CommitPolicy::OnDelivery);

        let state = watching(100.0);
        let failed = watch_loop.tick(state, at(0)).await;
        assert_eq!(failed.state, state);

        harness.notifier.set_failing(false);
        let retried = watch_loop.tick(failed.state, at(30)).await;

        assert_eq!(retried.state.anchor, Some(Price::new(99.0)));
        assert_eq!(
            harness.notifier.sent(),
            vec!["📉 ASTS at $98.70 (-$1.00)".to_string()]
        );
    }

    #[tokio::test]
    async fn gated_startup_before_open_idles_without_fetching() {
        let harness = Harness::new();
        let outcome = harness.gated_loop().startup(wednesday(8, 0)).await;

        assert_eq!(outcome.state.phase, WatchPhase::Idle);
        assert!(!outcome.state.session_open);
        assert_eq!(outcome.state.anchor, None);
        assert_eq!(harness.prices.calls(), 0);
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn gated_startup_during_session_watches_without_open_notice() {
        let harness = Harness::new();
        harness.prices.push(Some(25.0));
        harness.prices.push(Some(25.3));
        let watch_loop = harness.gated_loop();

        let started = watch_loop.startup(wednesday(11, 0)).await;
        assert_eq!(started.state.phase, WatchPhase::Watching);
        assert_eq!(started.state.anchor, Some(Price::new(25.0)));

        let outcome = watch_loop.tick(started.state, wednesday(11, 1)).await;
        assert!(matches!(
            outcome.events.as_slice(),
            [WatchEvent::Held(HoldReason::BelowThreshold { .. })]
        ));
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn session_transitions_are_announced_once() {
        let harness = Harness::new();
        harness.prices.push(Some(25.0));
        harness.prices.push(Some(25.4));
        let watch_loop = harness.gated_loop();

        let mut state = watch_loop.startup(wednesday(9, 0)).await.state;
        let mut transitions = Vec::new();
        for time in [
            wednesday(9, 15),
            wednesday(9, 30),
            wednesday(9, 31),
            wednesday(16, 0),
            wednesday(16, 1),
        ] {
            let outcome = watch_loop.tick(state, time).await;
            state = outcome.state;
            transitions.extend(outcome.events.into_iter().filter(|event| {
                matches!(
                    event,
                    WatchEvent::SessionOpened { .. } | WatchEvent::SessionClosed
                )
            }));
        }

        assert_eq!(
            transitions,
            vec![
                WatchEvent::SessionOpened {
                    price: Price::new(25.0)
                },
                WatchEvent::SessionClosed,
            ]
        );
        assert_eq!(state.phase, WatchPhase::Idle);
        assert_eq!(harness.prices.calls(), 2);

        let sent = harness.notifier.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[1].starts_with("🔔 Market open"));
        assert!(sent[2].starts_with("🌙 Market closed"));
    }

    #[tokio::test]
    async fn open_transition_replaces_stale_anchor() {
        let harness = Harness::new();
        harness.prices.push(Some(31.0));
        let watch_loop = harness.gated_loop();

        let overnight = WatchState {
            anchor: Some(Price::new(27.0)),
            last_alert: Some(wednesday(9, 29).monotonic),
            session_open: false,
            phase: WatchPhase::Idle,
        };
        let outcome = watch_loop.tick(overnight, wednesday(9, 30)).await;

        assert_eq!(outcome.state.anchor, Some(Price::new(31.0)));
        assert_eq!(outcome.state.last_alert, None);
        assert_eq!(outcome.state.phase, WatchPhase::Watching);
        assert!(
            !outcome
                .events
                .iter()
                .any(|event| matches!(event, WatchEvent::Alerted { .. }))
        );
    }

    #[tokio::test]
    async fn failed_fetch_on_open_retries_whole_transition() {
        let harness = Harness::new();
        harness.prices.push(None);
        harness.prices.push(Some(26.0));
        let watch_loop = harness.gated_loop();
        let idle = WatchState {
            phase: WatchPhase::Idle,
            ..WatchState::default()
        };

        let failed = watch_loop.tick(idle, wednesday(9, 30)).await;
        assert_eq!(failed.state, idle);
        assert!(harness.notifier.sent().is_empty());

        let opened = watch_loop.tick(failed.state, wednesday(9, 31)).await;
        assert!(opened.state.session_open);
        assert_eq!(opened.state.anchor, Some(Price::new(26.0)));
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn weekend_ticks_do_not_fetch() {
        let harness = Harness::new();
        let watch_loop = harness.gated_loop();
        let saturday = New_York
            .with_ymd_and_hms(2024, 5, 18, 10, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        let idle = WatchState {
            phase: WatchPhase::Idle,
            ..WatchState::default()
        };

        let outcome = watch_loop.tick(idle, moment(saturday, 0)).await;

        assert_eq!(outcome.events, vec![WatchEvent::OutOfSession]);
        assert_eq!(harness.prices.calls(), 0);
    }
}
