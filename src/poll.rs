//! History lookup under the bounded retry policy

use std::sync::Arc;

use log::{debug, info, trace};
use serde_json::{json, Value};

use crate::envelope::image_info;
use crate::error::{Error, Result};
use crate::failover::{Attempt, RetryPolicy};
use crate::projector::ResponseProjector;
use crate::request::{GenerationResult, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::transport::{is_blank, Transport, UpstreamRequest, HISTORY_BY_IDS_PATH};
use crate::Credential;

/// Classified outcome of one poll attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome
{   Empty
  , Malformed
  , NotFound
  , Success
  , TransportError
}

#[derive(Clone)]
pub struct ResultPoller
{   transport: Arc<dyn Transport>
  , policy: RetryPolicy
  , assistant_id: u32
}

impl ResultPoller
{   pub fn new(
      transport: Arc<dyn Transport>
    , policy: RetryPolicy
    , assistant_id: u32
    ) -> Self
    {   ResultPoller
        {   transport
          , policy
          , assistant_id
        }
    }

    /// Fetch and project the result of `job_id`.
    ///
    /// Empty bodies and transport errors are retried; a non-object body
    /// or a missing entry fails on the spot.
    pub async fn poll(
      &self
    , job_id: &str
    , credential: &Credential
    ) -> Result<GenerationResult>
    {   debug!("Polling history {} with {}", job_id, credential);
        let max = self.policy.max_attempts;

        self.policy.run("history lookup", move |attempt| async move {
          let request = self.history_request(job_id);
          let response = self.transport.execute(request, credential).await;
          let (outcome, verdict) = classify(job_id, response);
          info!(
            "History {} attempt {}/{}: {:?}",
            job_id, attempt, max, outcome
          );
          verdict
        }).await
    }

    fn history_request(&self, job_id: &str) -> UpstreamRequest
    {   UpstreamRequest::post(HISTORY_BY_IDS_PATH, json!({
          "history_ids": [job_id],
          "image_info": image_info(DEFAULT_WIDTH, DEFAULT_HEIGHT),
          "http_common_info": {
            "aid": self.assistant_id,
            "device_platform": "web",
            "region": "CN",
          },
        }))
    }
}

/// Sort one raw response into an outcome and what the policy should do
pub fn classify(
  job_id: &str
, response: Result<Option<Value>>
) -> (PollOutcome, Attempt<GenerationResult>)
{   let payload = match response
    {   Err(e) => {
          return (PollOutcome::TransportError, Attempt::Retryable(e));
        }
      , Ok(None) => {
          return (PollOutcome::Empty, Attempt::Retryable(Error::EmptyResponse(
            "history lookup returned no body".to_string()
          )));
        }
      , Ok(Some(payload)) if is_blank(&payload) => {
          return (
            PollOutcome::Empty,
            Attempt::Retryable(Error::EmptyResponse(
              format!("history lookup returned blank body {}", payload)
            ))
          );
        }
      , Ok(Some(payload)) => payload
    };
    trace!("History payload for {}: {}", job_id, payload);

    let Value::Object(entries) = payload
    else
    {   return (
          PollOutcome::Malformed,
          Attempt::Terminal(Error::MalformedResponse(
            "history lookup body is not an object".to_string()
          ))
        );
    };

    match entries.get(job_id)
    {   None | Some(Value::Null) => (
          PollOutcome::NotFound,
          Attempt::Terminal(Error::JobNotFound(job_id.to_string()))
        )
      , Some(entry) => {
          let items = entry.get("item_list")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
          (
            PollOutcome::Success,
            Attempt::Success(ResponseProjector::project(items))
          )
        }
    }
}
