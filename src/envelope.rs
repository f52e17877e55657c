//! Versioned draft payload submitted for image generation

use log::debug;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::models::ModelResolver;
use crate::request::GenerationRequest;
use crate::transport::{UpstreamRequest, DRAFT_GENERATE_PATH};

/// Upstream draft schema version this client targets
pub const DRAFT_VERSION: &str = "3.0.2";
pub const SEED_BASE: u64 = 2_500_000_000;
pub const SEED_SPREAD: u64 = 100_000_000;

/// Named output resolutions requested for every image
pub const SCENE_LADDER: [(&str, u32); 6] = [
  ("normal", 2400),
  ("loss", 1080),
  ("loss", 900),
  ("loss", 720),
  ("loss", 480),
  ("loss", 360),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageScene
{   pub scene: &'static str
  , pub width: u32
  , pub height: u32
  , pub uniq_key: String
  , pub format: &'static str
}

/// The scene ladder as sent upstream, keyed by width
pub fn scene_list() -> Vec<ImageScene>
{   SCENE_LADDER.iter()
      .map(|&(scene, size)| ImageScene
      {   scene
        , width: size
        , height: size
        , uniq_key: size.to_string()
        , format: "webp"
      })
      .collect()
}

/// `image_info` block shared by history and asset lookups
pub fn image_info(width: u32, height: u32) -> Value
{   json!({
      "width": width,
      "height": height,
      "format": "webp",
      "image_scene_list": scene_list(),
    })
}

// ===== Draft Types =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub min_version: &'static str
  , pub is_from_tsn: bool
  , pub version: &'static str
  , pub main_component_id: String
  , pub component_list: Vec<ImageComponent>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageComponent
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub min_version: &'static str
  , pub generate_type: &'static str
  , pub aigc_mode: &'static str
  , pub abilities: Abilities
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Abilities
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub generate: Generate
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generate
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub core_param: CoreParam
  , pub history_option: Stamp
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreParam
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub model: &'static str
  , pub prompt: String
  , pub negative_prompt: String
  , pub seed: u64
  , pub sample_strength: f64
  , pub image_ratio: u32
  , pub large_image_info: LargeImageInfo
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargeImageInfo
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
  , pub height: u32
  , pub width: u32
}

/// Bare typed sub-object carrying only its id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stamp
{   #[serde(rename = "type")]
    pub kind: &'static str
  , pub id: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsExtra
{   pub template_id: &'static str
  , pub generate_count: u32
  , pub prompt_source: &'static str
  , pub template_source: &'static str
  , pub last_request_id: &'static str
  , pub origin_request_id: &'static str
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFlags
{   pub scenario: &'static str
  , pub feature_key: &'static str
  , pub feature_entrance: &'static str
  , pub feature_entrance_detail: String
}

/// Everything needed for one draft-generate submission
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope
{   pub submit_id: String
  , pub root_model: &'static str
  , pub draft: Draft
  , pub metrics: MetricsExtra
  , pub features: FeatureFlags
}

impl RequestEnvelope
{   pub fn core_param(&self) -> Option<&CoreParam>
    {   self.draft.component_list
          .first()
          .map(|c| &c.abilities.generate.core_param)
    }

    /// Render as the upstream request; draft, metrics and feature flags
    /// travel as embedded JSON strings, the flags percent-encoded
    pub fn to_request(&self, assistant_id: u32) -> Result<UpstreamRequest>
    {   let body = json!({
          "extend": {
            "root_model": self.root_model,
            "template_id": "",
          },
          "submit_id": self.submit_id,
          "metrics_extra": serde_json::to_string(&self.metrics)?,
          "draft_content": serde_json::to_string(&self.draft)?,
          "http_common_info": {
            "aid": assistant_id,
          },
        });

        // upstream expects the flags pre-encoded, on top of query encoding
        let features = serde_json::to_string(&self.features)?;
        Ok(UpstreamRequest::post(DRAFT_GENERATE_PATH, body)
          .with_query("babi_param", urlencoding::encode(&features)))
    }
}

/// Builds fresh envelopes; no state carries over between calls
pub struct RequestEnvelopeBuilder;

impl RequestEnvelopeBuilder
{   pub fn build(request: &GenerationRequest) -> RequestEnvelope
    {   let model = ModelResolver::resolve(&request.model);
        let width = request.width_or_default();
        let height = request.height_or_default();
        let sample_strength = request.sample_strength_or_default();
        debug!(
          "Building envelope: model {} -> {} {}x{} strength {}",
          request.model, model, width, height, sample_strength
        );

        let component_id = new_id();
        let core_param = CoreParam
        {   kind: ""
          , id: new_id()
          , model
          , prompt: request.prompt.clone()
          , negative_prompt: request.negative_prompt
              .clone()
              .unwrap_or_default()
          , seed: draw_seed()
          , sample_strength
          , image_ratio: 1
          , large_image_info: LargeImageInfo
            {   kind: ""
              , id: new_id()
              , height
              , width
            }
        };

        let draft = Draft
        {   kind: "draft"
          , id: new_id()
          , min_version: DRAFT_VERSION
          , is_from_tsn: true
          , version: DRAFT_VERSION
          , main_component_id: component_id.clone()
          , component_list: vec![
              ImageComponent
              {   kind: "image_base_component"
                , id: component_id
                , min_version: DRAFT_VERSION
                , generate_type: "generate"
                , aigc_mode: "workbench"
                , abilities: Abilities
                  {   kind: ""
                    , id: new_id()
                    , generate: Generate
                      {   kind: ""
                        , id: new_id()
                        , core_param
                        , history_option: Stamp
                          {   kind: ""
                            , id: new_id()
                          }
                      }
                  }
              }
            ]
        };

        RequestEnvelope
        {   submit_id: new_id()
          , root_model: model
          , draft
          , metrics: MetricsExtra
            {   template_id: ""
              , generate_count: 1
              , prompt_source: "custom"
              , template_source: ""
              , last_request_id: ""
              , origin_request_id: ""
            }
          , features: FeatureFlags
            {   scenario: "image_video_generation"
              , feature_key: "aigc_to_image"
              , feature_entrance: "to_image"
              , feature_entrance_detail: format!("to_image-{}", model)
            }
        }
    }
}

/// Seed in `[SEED_BASE, SEED_BASE + SEED_SPREAD)`
pub fn draw_seed() -> u64
{   SEED_BASE + rand::thread_rng().gen_range(0..SEED_SPREAD)
}

fn new_id() -> String
{   Uuid::new_v4().to_string()
}
