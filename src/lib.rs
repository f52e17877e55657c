pub mod error;
pub mod config;
pub mod transport;
pub mod request;
pub mod failover;
pub mod credentials;
pub mod models;
pub mod envelope;
pub mod submit;
pub mod projector;
pub mod poll;
pub mod assets;
pub mod client;

use std::fmt;
use serde::{Deserialize, Serialize};

/*

jimeng-core is the async job client sitting behind an image-generation
API facade. It speaks to the upstream Jimeng web service on behalf of a
caller-supplied pool of session tokens:

  caller -> CredentialPool::select   (random token per call)
         -> ModelResolver::resolve   (public alias -> backend model)
         -> RequestEnvelopeBuilder   (versioned draft payload)
         -> JobSubmitter::submit     (credit check, top-up, draft generate)
         -> job id

  later  -> ResultPoller::poll       (bounded fixed-delay retry)
         -> ResponseProjector        (stable image URL descriptors)

The network is reached only through the injected `Transport` trait;
`transport::http::HttpTransport` is the default reqwest implementation.

*/

pub use client::JimengClient;
pub use config::{ClientConfig, RetryConfig};
pub use credentials::CredentialPool;
pub use error::{Error, ErrorKind, Result};
pub use request::{
  AssetListParams, AssetListResult, GenerationRequest, GenerationResult,
  ImageDescriptor,
};
pub use transport::{Transport, UpstreamRequest};

/// JIMENG STRUCTURES:

/// Opaque upstream session token.
///
/// Formatting never prints the token itself, only a redacted mask.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential
{   pub fn new(token: impl Into<String>) -> Self
    {   Credential(token.into())
    }

    /// Raw token, for rendering into an authorization header only
    pub fn expose(&self) -> &str
    {   &self.0
    }

    fn masked(&self) -> String
    {   let visible: String = self.0.chars().take(4).collect();
        if self.0.chars().count() <= 8
        {   "****".to_string()
        } else
        {   format!("{}****", visible)
        }
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "Credential({})", self.masked())
    }
}

impl fmt::Display for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(&self.masked())
    }
}

/// Upstream-assigned history record id
pub type JobId = String;

/// A submitted generation job.
///
/// Only the id is serialized; the originating credential stays in
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job
{   #[serde(rename = "historyId")]
    pub job_id: JobId
  , #[serde(skip)]
    pub credential: Credential
}
