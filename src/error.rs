use serde::Serialize;
use thiserror::Error as ThisError;

/// Custom error type for jimeng-core operations
/// Implements Clone so results can be handed across tasks
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error
{   /// No credential left to select from
    #[error("No credential available")]
    CredentialExhausted
  , /// Account has no credit and the top-up did not help
    #[error("Insufficient credit: {0}")]
    InsufficientCredit(String)
  , /// Submission went through but upstream returned no job id
    #[error("Image generation failed: {0}")]
    JobIdMissing(String)
  , /// Upstream answered with no body at all
    #[error("Empty response: {0}")]
    EmptyResponse(String)
  , /// Every attempt came back empty
    #[error("Retry budget exceeded after {attempts} attempts: {detail}")]
    RetryBudgetExceeded
    {   attempts: usize
      , detail: String
    }
  , /// Upstream body was not a structured object
    #[error("Malformed response: {0}")]
    MalformedResponse(String)
  , /// History lookup had no entry for the requested id
    #[error("Job not found: {0}")]
    JobNotFound(String)
  , /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(String)
  , /// Upstream returned a non-zero `ret` code
    #[error("API error {ret}: {message}")]
    Api
    {   ret: String
      , message: String
    }
  , /// Failed to (de)serialize a payload
    #[error("Parse error: {0}")]
    Parse(String)
  , /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String)
}

/// Stable, machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind
{   CredentialExhausted
  , InsufficientCredit
  , JobIdMissing
  , EmptyResponse
  , RetryBudgetExceeded
  , MalformedResponse
  , JobNotFound
  , Transport
  , Upstream
  , Parse
  , Configuration
}

impl Error
{   /// Category of this error, independent of its detail text
    pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::CredentialExhausted => ErrorKind::CredentialExhausted
          , Error::InsufficientCredit(_) => ErrorKind::InsufficientCredit
          , Error::JobIdMissing(_) => ErrorKind::JobIdMissing
          , Error::EmptyResponse(_) => ErrorKind::EmptyResponse
          , Error::RetryBudgetExceeded { .. } => {
              ErrorKind::RetryBudgetExceeded
            }
          , Error::MalformedResponse(_) => ErrorKind::MalformedResponse
          , Error::JobNotFound(_) => ErrorKind::JobNotFound
          , Error::Http(_) => ErrorKind::Transport
          , Error::Api { .. } => ErrorKind::Upstream
          , Error::Parse(_) => ErrorKind::Parse
          , Error::InvalidConfiguration(_) => ErrorKind::Configuration
        }
    }

    /// Error to surface once the retry budget is spent.
    ///
    /// An empty response turns into `RetryBudgetExceeded`; anything else
    /// (transport failures) is handed back unchanged.
    pub fn into_exhausted(self, attempts: usize) -> Self
    {   match self
        {   Error::EmptyResponse(detail) => {
              Error::RetryBudgetExceeded { attempts, detail }
            }
          , other => other
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
