//! Per-call credential selection

use log::debug;
use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::Credential;

/// Credentials supplied with one logical request.
///
/// Selection is uniform and stateless: two consecutive calls may land on
/// different credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPool
{   credentials: Vec<Credential>
}

impl CredentialPool
{   pub fn new<I, S>(tokens: I) -> Self
    where
      I: IntoIterator<Item = S>
    , S: Into<String>
    {   CredentialPool
        {   credentials: tokens.into_iter()
              .map(|t| Credential::new(t))
              .collect()
        }
    }

    /// Split an `Authorization` header value of the form
    /// `Bearer tok1,tok2,...` into a pool
    pub fn from_authorization(header: &str) -> Self
    {   let trimmed = header.trim();
        // scheme only counts when followed by whitespace or nothing
        let tokens = match trimmed.strip_prefix("Bearer")
        {   Some(rest) if rest.is_empty()
              || rest.starts_with(char::is_whitespace) => rest
          , _ => trimmed
        };
        CredentialPool::new(
          tokens.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
        )
    }

    pub fn len(&self) -> usize
    {   self.credentials.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.credentials.is_empty()
    }

    pub fn contains(&self, credential: &Credential) -> bool
    {   self.credentials.contains(credential)
    }

    /// Pick one credential uniformly at random
    pub fn select(&self) -> Result<Credential>
    {   let picked = self.credentials
          .choose(&mut rand::thread_rng())
          .cloned()
          .ok_or(Error::CredentialExhausted)?;
        debug!(
          "Selected credential {} from pool of {}",
          picked,
          self.credentials.len()
        );
        Ok(picked)
    }
}
