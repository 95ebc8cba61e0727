use crate::credentials::{EnvSource, required};

pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn from_env(env: &dyn EnvSource) -> anyhow::Result<Self> {
        let bot_token = required(env, "TELEGRAM_BOT_TOKEN")?;
        let chat_id = required(env, "TELEGRAM_CHAT_ID")?;

        Ok(Self { bot_token, chat_id })
    }
}
