//! Bounded retry logic for upstream reads

use std::future::Future;
use std::time::Duration;
use log::{debug, info};

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Classified outcome of a single attempt
#[derive(Debug)]
pub enum Attempt<T>
{   /// Finished, hand the value back
    Success(T)
  , /// Worth another try if the budget allows
    Retryable(Error)
  , /// Give up now, no further attempts
    Terminal(Error)
}

/// Retry policy with a fixed delay between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy
{   pub max_attempts: usize
  , pub delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_attempts: usize
    , delay_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_attempts: max_attempts.max(1)
          , delay: Duration::from_millis(delay_ms)
        }
    }

    /// Single attempt, no waiting
    pub fn no_retry() -> Self
    {   RetryPolicy::new(1, 0)
    }

    /// Run `attempt` until it succeeds, fails terminally, or the budget
    /// is spent. `attempt` receives the 1-based attempt number.
    ///
    /// After the last retryable failure the error goes through
    /// [`Error::into_exhausted`].
    pub async fn run<T, F, Fut>(
      &self
    , label: &str
    , mut attempt: F
    ) -> Result<T>
    where
      F: FnMut(usize) -> Fut
    , Fut: Future<Output = Attempt<T>>
    {   let mut number = 1;
        loop
        {   match attempt(number).await
            {   Attempt::Success(value) => {
                  debug!(
                    "{} succeeded on attempt {}/{}",
                    label, number, self.max_attempts
                  );
                  return Ok(value);
                }
              , Attempt::Terminal(e) => {
                  debug!(
                    "{} failed terminally on attempt {}/{}: {}",
                    label, number, self.max_attempts, e
                  );
                  return Err(e);
                }
              , Attempt::Retryable(e) => {
                  if number >= self.max_attempts
                  {   debug!(
                        "{} exhausted {} attempts: {}",
                        label, self.max_attempts, e
                      );
                      return Err(e.into_exhausted(number));
                  }
                  info!(
                    "{} attempt {}/{} failed ({}), retrying in {}ms",
                    label,
                    number,
                    self.max_attempts,
                    e,
                    self.delay.as_millis()
                  );
                  tokio::time::sleep(self.delay).await;
                  number += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy
{   fn from(config: &RetryConfig) -> Self
    {   RetryPolicy::new(config.max_attempts, config.delay_ms)
    }
}
