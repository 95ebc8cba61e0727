use std::env;

use anyhow::{Result, anyhow};

/// Where transport credentials are read from.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

#[cfg(test)]
impl EnvSource for std::collections::HashMap<&str, &str> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.to_string())
    }
}

/// Blank values count as missing.
pub fn required(env: &dyn EnvSource, name: &str) -> Result<String> {
    env.var(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow!("{name} not set"))
}
