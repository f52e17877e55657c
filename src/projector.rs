//! Shapes upstream history items into stable descriptors

use serde_json::Value;

use crate::request::{GenerationResult, ImageDescriptor};

pub struct ResponseProjector;

impl ResponseProjector
{   /// Project an `item_list`, preserving upstream order.
    ///
    /// Missing sub-fields become empty strings.
    pub fn project(items: &[Value]) -> GenerationResult
    {   GenerationResult
        {   images: items.iter().map(Self::project_item).collect()
        }
    }

    pub fn project_item(item: &Value) -> ImageDescriptor
    {   ImageDescriptor
        {   webp: string_at(item, "/common_attr/cover_url_map/2400")
          , cover: string_at(item, "/common_attr/cover_url_map/1080")
          , png: string_at(item, "/common_attr/cover_url")
          , large: string_at(item, "/image/large_images/0/image_url")
        }
    }
}

fn string_at(item: &Value, pointer: &str) -> String
{   item.pointer(pointer)
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string()
}
