#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use jimeng_core::{Credential, Error, Transport, UpstreamRequest};
use serde_json::{json, Value};

pub type Reply = Result<Option<Value>, Error>;

/// Request as seen by the stub
#[derive(Debug, Clone)]
pub struct Recorded
{   pub request: UpstreamRequest
  , pub credential: Credential
}

/// Transport replaying scripted replies per path.
///
/// Once a path's script runs dry its fallback reply is used, or
/// `Ok(None)` without one.
#[derive(Default)]
pub struct ScriptedTransport
{   scripts: Mutex<HashMap<&'static str, VecDeque<Reply>>>
  , fallbacks: Mutex<HashMap<&'static str, Reply>>
  , calls: Mutex<Vec<Recorded>>
}

impl ScriptedTransport
{   pub fn new() -> Self
    {   Self::default()
    }

    pub fn script(self, path: &'static str, replies: Vec<Reply>) -> Self
    {   self.scripts.lock().unwrap()
          .entry(path)
          .or_default()
          .extend(replies);
        self
    }

    pub fn always(self, path: &'static str, reply: Reply) -> Self
    {   self.fallbacks.lock().unwrap().insert(path, reply);
        self
    }

    pub fn calls(&self) -> Vec<Recorded>
    {   self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Recorded>
    {   self.calls()
          .into_iter()
          .filter(|c| c.request.path == path)
          .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport
{   async fn execute(
      &self
    , request: UpstreamRequest
    , credential: &Credential
    ) -> Result<Option<Value>, Error>
    {   let path = request.path;
        self.calls.lock().unwrap().push(Recorded
        {   request
          , credential: credential.clone()
        });

        let scripted = self.scripts.lock().unwrap()
          .get_mut(path)
          .and_then(VecDeque::pop_front);
        match scripted
        {   Some(reply) => reply
          , None => self.fallbacks.lock().unwrap()
              .get(path)
              .cloned()
              .unwrap_or(Ok(None))
        }
    }
}

pub fn init_logger()
{   let _ = env_logger::builder().is_test(true).try_init();
}

pub fn credit(total: i64) -> Reply
{   Ok(Some(json!({
      "credit": {
        "gift_credit": total,
        "purchase_credit": 0,
        "vip_credit": 0
      }
    })))
}

pub fn history_item(cover: &str, webp: &str, small: &str, large: &str) -> Value
{   json!({
      "common_attr": {
        "cover_url": cover,
        "cover_url_map": { "2400": webp, "1080": small }
      },
      "image": { "large_images": [ { "image_url": large } ] }
    })
}

/// Parse the draft embedded in a recorded draft-generate body
pub fn embedded_draft(recorded: &Recorded) -> Value
{   let raw = recorded.request.body["draft_content"]
      .as_str()
      .expect("draft_content is a string");
    serde_json::from_str(raw).expect("draft_content is JSON")
}
