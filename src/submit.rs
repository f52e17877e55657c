//! Draft submission with credit precheck

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::envelope::RequestEnvelope;
use crate::error::{Error, Result};
use crate::transport::{
  Transport, UpstreamRequest, CREDIT_RECEIVE_PATH, USER_CREDIT_PATH,
};
use crate::{Credential, Job, JobId};

/// Submits envelopes. Never retries: a duplicate submission costs credit
/// and creates a second job.
#[derive(Clone)]
pub struct JobSubmitter
{   transport: Arc<dyn Transport>
  , assistant_id: u32
  , abort_on_failed_top_up: bool
}

impl JobSubmitter
{   pub fn new(
      transport: Arc<dyn Transport>
    , assistant_id: u32
    , abort_on_failed_top_up: bool
    ) -> Self
    {   JobSubmitter
        {   transport
          , assistant_id
          , abort_on_failed_top_up
        }
    }

    /// Credit check, optional top-up, then draft generate
    pub async fn submit(
      &self
    , envelope: &RequestEnvelope
    , credential: &Credential
    ) -> Result<Job>
    {   let balance = self.credit_balance(credential).await?;
        debug!("Credit balance for {}: {}", credential, balance);

        if balance <= 0
        {   info!("No credit left for {}, requesting top-up", credential);
            if let Err(e) = self.receive_credit(credential).await
            {   if self.abort_on_failed_top_up
                {   error!("Credit top-up failed: {}", e);
                    return Err(Error::InsufficientCredit(e.to_string()));
                }
                warn!("Credit top-up failed, submitting anyway: {}", e);
            }
        }

        let request = envelope.to_request(self.assistant_id)?;
        let response = self.transport.execute(request, credential).await?;
        let job_id = extract_job_id(response.as_ref())?;
        info!("Submitted draft, history id {}", job_id);

        Ok(Job
        {   job_id
          , credential: credential.clone()
        })
    }

    /// Sum of gift, purchase and vip credit
    pub async fn credit_balance(&self, credential: &Credential) -> Result<i64>
    {   let request = UpstreamRequest::post(USER_CREDIT_PATH, json!({}));
        let response = self.transport.execute(request, credential).await?;

        let credit = response
          .as_ref()
          .and_then(|r| r.get("credit"));
        let total = ["gift_credit", "purchase_credit", "vip_credit"]
          .iter()
          .map(|key| {
            credit
              .and_then(|c| c.get(*key))
              .and_then(Value::as_i64)
              .unwrap_or(0)
          })
          .sum();
        Ok(total)
    }

    /// Claim the daily credit grant
    pub async fn receive_credit(&self, credential: &Credential) -> Result<()>
    {   let request = UpstreamRequest::post(
          CREDIT_RECEIVE_PATH,
          json!({ "time_zone": "Asia/Shanghai" })
        );
        let response = self.transport.execute(request, credential).await?;
        if let Some(total) = response
          .as_ref()
          .and_then(|r| r.get("cur_total_credits"))
        {   info!("Credit received, total now {}", total);
        }
        Ok(())
    }
}

fn extract_job_id(response: Option<&Value>) -> Result<JobId>
{   let id = response
      .and_then(|r| r.pointer("/aigc_data/history_record_id"))
      .and_then(|v| match v
      {   Value::String(s) => Some(s.clone())
        , Value::Number(n) => Some(n.to_string())
        , _ => None
      })
      .filter(|s| !s.is_empty());

    id.ok_or_else(|| {
      error!("Draft response carried no history_record_id");
      Error::JobIdMissing(
        "upstream returned no history_record_id".to_string()
      )
    })
}
