//! Configuration for the upstream client and its retry behavior

use std::env;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://jimeng.jianying.com";
pub const DEFAULT_ASSISTANT_ID: u32 = 513695;
pub const DEFAULT_USER_AGENT: &str
  = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Retry configuration for the poll and asset-list paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Total attempts, including the first one
    pub max_attempts: usize
  , /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_attempts: 3
          , delay_ms: 2000
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig
{   /// Upstream base URL
    pub base_url: String
  , /// Upstream application id sent as `aid`
    pub assistant_id: u32
  , /// Per-request timeout of the HTTP transport, in seconds
    pub timeout_secs: u64
  , /// User agent sent by the HTTP transport
    pub user_agent: String
  , /// Poll retry policy
    pub retry: RetryConfig
  , /// Fail the submission when the credit top-up fails
    pub abort_on_failed_top_up: bool
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   base_url: DEFAULT_BASE_URL.to_string()
          , assistant_id: DEFAULT_ASSISTANT_ID
          , timeout_secs: 45
          , user_agent: DEFAULT_USER_AGENT.to_string()
          , retry: RetryConfig::default()
          , abort_on_failed_top_up: false
        }
    }
}

impl ClientConfig
{   pub fn new() -> Self
    {   Self::default()
    }

    /// Build a configuration from `JIMENG_*` environment variables,
    /// keeping the default for anything unset or unparsable
    pub fn from_env() -> Self
    {   let mut config = Self::default();

        if let Ok(url) = env::var("JIMENG_BASE_URL")
        {   config.base_url = url;
        }
        if let Some(aid) = parse_var("JIMENG_ASSISTANT_ID")
        {   config.assistant_id = aid;
        }
        if let Some(secs) = parse_var("JIMENG_TIMEOUT_SECS")
        {   config.timeout_secs = secs;
        }
        if let Some(attempts) = parse_var("JIMENG_POLL_ATTEMPTS")
        {   config.retry.max_attempts = attempts;
        }
        if let Some(delay) = parse_var("JIMENG_POLL_DELAY_MS")
        {   config.retry.delay_ms = delay;
        }
        config.abort_on_failed_top_up
          = env::var("JIMENG_ABORT_ON_FAILED_TOP_UP")
            .ok()
            .map_or(false, |val| val == "true");

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self
    {   self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_retry(mut self, max_attempts: usize, delay_ms: u64) -> Self
    {   self.retry = RetryConfig { max_attempts, delay_ms };
        self
    }

    pub fn with_abort_on_failed_top_up(mut self, abort: bool) -> Self
    {   self.abort_on_failed_top_up = abort;
        self
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()>
    {   if self.base_url.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "base_url must not be empty".to_string()
            ));
        }
        if self.retry.max_attempts == 0
        {   return Err(Error::InvalidConfiguration(
              "retry.max_attempts must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T>
{   let raw = env::var(name).ok()?;
    match raw.parse()
    {   Ok(value) => Some(value)
      , Err(_) => {
          warn!("Ignoring unparsable {}={}", name, raw);
          None
        }
    }
}
