use std::sync::Arc;
use log::{debug, info};

use crate::assets::AssetLister;
use crate::config::ClientConfig;
use crate::credentials::CredentialPool;
use crate::envelope::RequestEnvelopeBuilder;
use crate::error::Result;
use crate::failover::RetryPolicy;
use crate::poll::ResultPoller;
use crate::request::{
  AssetListParams, AssetListResult, GenerationRequest, GenerationResult,
};
use crate::submit::JobSubmitter;
use crate::transport::{HttpTransport, Transport};
use crate::Job;

/// Public API for the upstream job client.
///
/// Holds no per-request state; every call is an independent unit, so a
/// single client can serve any number of concurrent callers.
#[derive(Clone)]
pub struct JimengClient
{   submitter: JobSubmitter
  , poller: ResultPoller
  , lister: AssetLister
}

impl JimengClient
{   /// Create a client over an injected transport
    pub fn new(
      config: &ClientConfig
    , transport: Arc<dyn Transport>
    ) -> Result<Self>
    {   config.validate()?;
        debug!("Creating JimengClient against {}", config.base_url);
        let policy = RetryPolicy::from(&config.retry);

        Ok(JimengClient
        {   submitter: JobSubmitter::new(
              transport.clone()
            , config.assistant_id
            , config.abort_on_failed_top_up
            )
          , poller: ResultPoller::new(
              transport.clone()
            , policy.clone()
            , config.assistant_id
            )
          , lister: AssetLister::new(
              transport
            , policy
            , config.assistant_id
            )
        })
    }

    /// Create a client over the default reqwest transport
    pub fn with_http(config: &ClientConfig) -> Result<Self>
    {   let transport = HttpTransport::new(config)?;
        Self::new(config, Arc::new(transport))
    }

    /// Submit a generation job and return its history id
    pub async fn generate(
      &self
    , request: &GenerationRequest
    , credentials: &CredentialPool
    ) -> Result<Job>
    {   let credential = credentials.select()?;
        info!(
          "Generating with model {} ({} credentials)",
          request.model,
          credentials.len()
        );
        let envelope = RequestEnvelopeBuilder::build(request);
        self.submitter.submit(&envelope, &credential).await
    }

    /// Retrieve the images produced for `job_id`
    pub async fn fetch_result(
      &self
    , job_id: &str
    , credentials: &CredentialPool
    ) -> Result<GenerationResult>
    {   let credential = credentials.select()?;
        self.poller.poll(job_id, &credential).await
    }

    /// List the account's assets, passed through unchanged
    pub async fn fetch_asset_list(
      &self
    , credentials: &CredentialPool
    , params: &AssetListParams
    ) -> Result<AssetListResult>
    {   let credential = credentials.select()?;
        self.lister.list(params, &credential).await
    }
}
