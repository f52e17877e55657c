//! Asset list pass-through

use std::sync::Arc;

use log::{debug, info};
use serde_json::{json, Value};

use crate::envelope::image_info;
use crate::error::{Error, Result};
use crate::failover::{Attempt, RetryPolicy};
use crate::request::{AssetListParams, AssetListResult};
use crate::transport::{is_blank, Transport, UpstreamRequest, ASSET_LIST_PATH};
use crate::Credential;

const DA_VERSION: &str = "3.2.5";
const DEFAULT_ASSET_TYPES: [u32; 7] = [1, 2, 5, 6, 7, 8, 9];

#[derive(Clone)]
pub struct AssetLister
{   transport: Arc<dyn Transport>
  , policy: RetryPolicy
  , assistant_id: u32
}

impl AssetLister
{   pub fn new(
      transport: Arc<dyn Transport>
    , policy: RetryPolicy
    , assistant_id: u32
    ) -> Self
    {   AssetLister
        {   transport
          , policy
          , assistant_id
        }
    }

    /// List assets; records are returned exactly as upstream sent them
    pub async fn list(
      &self
    , params: &AssetListParams
    , credential: &Credential
    ) -> Result<AssetListResult>
    {   debug!("Listing assets with {}", credential);
        let max = self.policy.max_attempts;

        self.policy.run("asset list", move |attempt| async move {
          let request = self.asset_request(params);
          let response = self.transport.execute(request, credential).await;
          let verdict = classify(response);
          info!("Asset list attempt {}/{}: {}", attempt, max, match &verdict
          {   Attempt::Success(_) => "success"
            , Attempt::Retryable(_) => "retryable"
            , Attempt::Terminal(_) => "terminal"
          });
          verdict
        }).await
    }

    pub fn asset_request(&self, params: &AssetListParams) -> UpstreamRequest
    {   UpstreamRequest::post(ASSET_LIST_PATH, json!({
          "aid": self.assistant_id.to_string(),
          "da_version": DA_VERSION,
          "aigc_features": "app_lip_sync",
          "count": params.count.unwrap_or(20),
          "direction": params.direction.unwrap_or(1),
          "mode": params.mode.as_deref().unwrap_or("workbench"),
          "option": {
            "image_info": image_info(2048, 2048),
            "origin_image_info": image_info(96, 2048),
            "order_by": params.option.order_by.unwrap_or(0),
            "only_favorited": params.option.only_favorited.unwrap_or(false),
            "end_time_stamp": params.option.end_time_stamp.unwrap_or(0),
          },
          "asset_type_list": params.asset_type_list
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSET_TYPES.to_vec()),
        }))
    }
}

fn classify(response: Result<Option<Value>>) -> Attempt<AssetListResult>
{   match response
    {   Err(e) => Attempt::Retryable(e)
      , Ok(None) => Attempt::Retryable(
          Error::EmptyResponse("asset list returned no body".to_string())
        )
      , Ok(Some(payload)) if is_blank(&payload) => Attempt::Retryable(
          Error::EmptyResponse(format!("asset list returned blank body {}", payload))
        )
      , Ok(Some(Value::Object(body))) => Attempt::Success(AssetListResult
        {   assets: body.get("asset_list")
              .and_then(Value::as_array)
              .cloned()
              .unwrap_or_default()
          , total: body.get("total")
              .and_then(Value::as_u64)
              .unwrap_or(0)
        })
      , Ok(Some(_)) => Attempt::Terminal(Error::MalformedResponse(
          "asset list body is not an object".to_string()
        ))
    }
}
