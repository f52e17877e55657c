use async_trait::async_trait;
use log::{debug, error, trace};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{Transport, UpstreamRequest};
use crate::Credential;

const REFERER: &str = "https://jimeng.jianying.com/ai-tool/image/generate";

/// Default transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport
{   base_url: String
  , assistant_id: u32
  , http_client: reqwest::Client
}

impl HttpTransport
{   pub fn new(config: &ClientConfig) -> Result<Self>
    {   debug!("Creating HttpTransport for {}", config.base_url);
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .user_agent(config.user_agent.clone())
          .build()?;

        Ok(HttpTransport
        {   base_url: config.base_url.trim_end_matches('/').to_string()
          , assistant_id: config.assistant_id
          , http_client
        })
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn execute(
      &self
    , request: UpstreamRequest
    , credential: &Credential
    ) -> Result<Option<Value>>
    {   let outbound = self.build_request(&request, credential)?;
        trace!("Upstream request {} as {}", outbound.url(), credential);

        let response = self.http_client
          .execute(outbound)
          .await
          .map_err(|e| {
            error!("HTTP error on {}: {}", request.path, e);
            Error::Http(e.to_string())
          })?;

        let status = response.status();
        trace!("Upstream response status: {}", status);

        let text = response.text().await.map_err(|e| {
          error!("Failed to read body from {}: {}", request.path, e);
          Error::Http(e.to_string())
        })?;

        read_response(status, &text)
    }
}

impl HttpTransport
{   /// Assemble the outbound POST: common query, caller query, auth and
    /// browser headers, JSON body
    pub fn build_request(
      &self
    , request: &UpstreamRequest
    , credential: &Credential
    ) -> Result<reqwest::Request>
    {   let url = format!("{}{}", self.base_url, request.path);
        let outbound = self.http_client
          .post(&url)
          .query(&[
            ("aid", self.assistant_id.to_string()),
            ("device_platform", "web".to_string()),
            ("region", "CN".to_string()),
          ])
          .query(&request.query)
          .header("Authorization", format!("Bearer {}", credential.expose()))
          .header("Accept", "application/json")
          .header("Referer", REFERER)
          .json(&request.body)
          .build()?;
        Ok(outbound)
    }
}

/// Reject non-2xx answers, unwrap the rest
pub fn read_response(
  status: reqwest::StatusCode
, text: &str
) -> Result<Option<Value>>
{   if !status.is_success()
    {   error!("Upstream returned {}", status);
        return Err(Error::Http(format!("status {}: {}", status, text)));
    }
    unwrap_payload(text)
}

/// Strip the upstream `{ret, errmsg, data}` wrapper.
///
/// Empty bodies and a null/missing `data` read as "no body"; non-JSON
/// text comes back as a JSON string.
pub fn unwrap_payload(text: &str) -> Result<Option<Value>>
{   if text.trim().is_empty()
    {   return Ok(None);
    }

    let value: Value = match serde_json::from_str(text)
    {   Ok(value) => value
      , Err(_) => return Ok(Some(Value::String(text.to_string())))
    };

    let Some(ret) = value.get("ret")
    else
    {   return Ok(Some(value));
    };

    let ret = match ret
    {   Value::String(s) => s.clone()
      , other => other.to_string()
    };
    if ret != "0"
    {   let message = value.get("errmsg")
          .and_then(Value::as_str)
          .unwrap_or("unknown error")
          .to_string();
        error!("Upstream error ret={}: {}", ret, message);
        return Err(Error::Api { ret, message });
    }

    match value.get("data")
    {   None | Some(Value::Null) => Ok(None)
      , Some(data) => Ok(Some(data.clone()))
    }
}
