use anyhow::Result;

use crate::{
    credentials::EnvSource,
    finnhub::{finnhub_config::FinnhubConfig, finnhub_price_source::FinnhubPriceSource},
    notify::log_notifier::LogNotifier,
    scenario::{notifiers::NotifierKind, sessions::SessionMode},
    session::session_gate::SessionGate,
    telegram::{telegram_config::TelegramConfig, telegram_notifier::TelegramNotifier},
    types::trading_hours::TradingHours,
    watch::watch_loop::{DynamicNotifier, DynamicPriceSource},
};

pub struct Scenario;

impl Scenario {
    pub fn price_source(env: &dyn EnvSource) -> Result<DynamicPriceSource> {
        tracing::info!(source = "finnhub", "creating price source");

        let config = FinnhubConfig::from_env(env)?;

        Ok(Box::new(FinnhubPriceSource::new(config)?))
    }

    pub fn notifier(kind: NotifierKind, env: &dyn EnvSource) -> Result<DynamicNotifier> {
        tracing::info!(notifier = %kind, "creating notifier");

        let notifier: DynamicNotifier = match kind {
            NotifierKind::DryRun => Box::new(LogNotifier),
            NotifierKind::Telegram => {
                let config = TelegramConfig::from_env(env)?;

                Box::new(TelegramNotifier::new(config)?)
            }
        };

        Ok(notifier)
    }

    pub fn session_gate(mode: SessionMode, trading_hours: TradingHours) -> Option<SessionGate> {
        tracing::info!(session = %mode, ?trading_hours, "creating session gate");

        match mode {
            SessionMode::Market => Some(SessionGate::new(trading_hours)),
            SessionMode::AlwaysOn => None,
        }
    }
}
