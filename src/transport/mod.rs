//! Transport seam between the job client and the network

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::Credential;

// Re-export for convenience
pub use http::HttpTransport;

pub const DRAFT_GENERATE_PATH: &str = "/mweb/v1/aigc_draft/generate";
pub const HISTORY_BY_IDS_PATH: &str = "/mweb/v1/get_history_by_ids";
pub const ASSET_LIST_PATH: &str = "/mweb/v1/get_asset_list";
pub const USER_CREDIT_PATH: &str = "/commerce/v1/benefits/user_credit";
pub const CREDIT_RECEIVE_PATH: &str = "/commerce/v1/benefits/credit_receive";

/// One outbound POST, independent of the HTTP library carrying it
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest
{   pub path: &'static str
  , pub query: Vec<(String, String)>
  , pub body: Value
}

impl UpstreamRequest
{   pub fn post(path: &'static str, body: Value) -> Self
    {   UpstreamRequest
        {   path
          , query: vec![]
          , body
        }
    }

    pub fn with_query(
      mut self
    , key: impl Into<String>
    , value: impl Into<String>
    ) -> Self
    {   self.query.push((key.into(), value.into()));
        self
    }
}

/// Carries upstream requests.
///
/// Implementations return the unwrapped `data` payload of the upstream
/// answer: `Ok(None)` when there was no body at all, `Ok(Some(_))` with
/// whatever JSON came back otherwise. Bodies that are not JSON are
/// handed back as a JSON string.
#[async_trait]
pub trait Transport: Send + Sync
{   async fn execute(
      &self
    , request: UpstreamRequest
    , credential: &Credential
    ) -> Result<Option<Value>>;
}

/// Payloads that read as "nothing yet": null, `""`, `0` and `false`
pub fn is_blank(payload: &Value) -> bool
{   match payload
    {   Value::Null => true
      , Value::Bool(b) => !b
      , Value::String(s) => s.is_empty()
      , Value::Number(n) => n.as_f64() == Some(0.0)
      , Value::Array(_) | Value::Object(_) => false
    }
}
