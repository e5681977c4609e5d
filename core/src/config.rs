//! Runtime configuration for the generation client.
//! Load once at startup, either from the environment or built explicitly.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct GenAiConfig {
    /// Key sent with every call and embedded into video download links.
    pub api_key: String,
    pub base_url: String,
    /// Per-request HTTP timeout; the poll loop itself is governed by `poll`.
    pub request_timeout: Duration,
    pub poll: PollPolicy,
}

/// How the video job loop waits for completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits until the provider reports completion.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl GenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll: PollPolicy::default(),
        }
    }

    /// Read `GEMINI_API_KEY` (or `API_KEY`) and the optional tuning variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .context("GEMINI_API_KEY or API_KEY must be set")?;
        if api_key.trim().is_empty() {
            return Err(anyhow!("GEMINI_API_KEY is empty"));
        }

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = env_number::<u64>("GENAI_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number::<u64>("GENAI_POLL_INTERVAL_SECS")? {
            config.poll.interval = Duration::from_secs(secs);
        }
        config.poll.max_attempts = env_number::<u32>("GENAI_POLL_MAX_ATTEMPTS")?;
        Ok(config)
    }
}

fn env_number<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_unbounded_five_second_polling() {
        let config = GenAiConfig::new("k");
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn env_number_rejects_garbage() {
        std::env::set_var("CHAITANYA_TEST_BAD_NUMBER", "soon");
        assert!(env_number::<u64>("CHAITANYA_TEST_BAD_NUMBER").is_err());
        std::env::set_var("CHAITANYA_TEST_GOOD_NUMBER", " 7 ");
        assert_eq!(env_number::<u64>("CHAITANYA_TEST_GOOD_NUMBER").unwrap(), Some(7));
        assert_eq!(env_number::<u64>("CHAITANYA_TEST_UNSET_NUMBER").unwrap(), None);
    }
}
