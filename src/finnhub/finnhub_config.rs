use crate::credentials::{EnvSource, required};

pub struct FinnhubConfig {
    pub token: String,
}

impl FinnhubConfig {
    pub fn from_env(env: &dyn EnvSource) -> anyhow::Result<Self> {
        let token = required(env, "FINNHUB_TOKEN")?;

        Ok(Self { token })
    }
}
