//! Public model aliases and their backend identifiers

use std::collections::HashMap;
use once_cell::sync::Lazy;

pub const DEFAULT_MODEL: &str = "jimeng-3.0";

static MODEL_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
  HashMap::from([
    ("jimeng-4.0", "high_aes_general_v40"),
    ("jimeng-3.1", "high_aes_general_v30l_art_fangzhou:general_v3.0_18b"),
    ("jimeng-3.0", "high_aes_general_v30l:general_v3.0_18b"),
    ("jimeng-2.1", "high_aes_general_v21_L:general_v2.1_L"),
    ("jimeng-2.0-pro", "high_aes_general_v20_L:general_v2.0_L"),
    ("jimeng-2.0", "high_aes_general_v20:general_v2.0"),
    ("jimeng-1.4", "high_aes_general_v14:general_v1.4"),
    ("jimeng-xl-pro", "text2img_xl_sft"),
  ])
});

/// Read-only alias lookup
pub struct ModelResolver;

impl ModelResolver
{   /// Backend id for `alias`, or the default model's id when unknown
    pub fn resolve(alias: &str) -> &'static str
    {   MODEL_MAP.get(alias)
          .or_else(|| MODEL_MAP.get(DEFAULT_MODEL))
          .copied()
          .unwrap_or_default()
    }

    pub fn is_known(alias: &str) -> bool
    {   MODEL_MAP.contains_key(alias)
    }

    /// Public aliases, sorted
    pub fn aliases() -> Vec<&'static str>
    {   let mut aliases: Vec<_> = MODEL_MAP.keys().copied().collect();
        aliases.sort_unstable();
        aliases
    }
}
