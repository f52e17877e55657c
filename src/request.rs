//! Caller-facing request and result types

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_WIDTH: u32 = 2048;
pub const DEFAULT_HEIGHT: u32 = 2048;
pub const DEFAULT_SAMPLE_STRENGTH: f64 = 0.5;

/// Image generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// Public model alias
    #[serde(default)]
    pub model: String
  , /// The prompt text
    pub prompt: String
  , /// What to steer away from
    #[serde(default)]
    pub negative_prompt: Option<String>
  , #[serde(default)]
    pub width: Option<u32>
  , #[serde(default)]
    pub height: Option<u32>
  , /// Sampling strength in `[0, 1]`
    #[serde(default)]
    pub sample_strength: Option<f64>
}

impl GenerationRequest
{   pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self
    {   GenerationRequest
        {   model: model.into()
          , prompt: prompt.into()
          , negative_prompt: None
          , width: None
          , height: None
          , sample_strength: None
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self
    {   self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_sample_strength(mut self, strength: f64) -> Self
    {   self.sample_strength = Some(strength);
        self
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self
    {   self.negative_prompt = Some(negative.into());
        self
    }

    pub fn width_or_default(&self) -> u32
    {   self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height_or_default(&self) -> u32
    {   self.height.unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn sample_strength_or_default(&self) -> f64
    {   self.sample_strength.unwrap_or(DEFAULT_SAMPLE_STRENGTH)
    }
}

/// URLs of one generated image at the named resolutions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor
{   /// 2400-wide preview
    pub webp: String
  , /// 1080-wide cover
    pub cover: String
  , /// Original cover
    #[serde(alias = "jpeg")]
    pub png: String
  , /// First large image
    pub large: String
}

/// Projected history lookup, assets in upstream order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult
{   pub images: Vec<ImageDescriptor>
}

/// Asset list query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetListParams
{   pub count: Option<u32>
  , pub direction: Option<i32>
  , pub mode: Option<String>
  , pub option: AssetListFilters
  , /// Asset type filter
    pub asset_type_list: Option<Vec<u32>>
}

/// Caller filters nested under the asset list `option`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetListFilters
{   pub order_by: Option<i32>
  , pub only_favorited: Option<bool>
  , pub end_time_stamp: Option<u64>
}

/// Asset list answer, records passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetListResult
{   pub assets: Vec<Value>
  , pub total: u64
}
