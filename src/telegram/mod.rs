pub mod telegram_config;
pub mod telegram_notifier;
