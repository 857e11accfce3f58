//! Fetch pipeline that revalidates cached responses with the server.

use reqwest::StatusCode;
use tracing::debug;

use super::storage::CacheStorage;
use super::traits::{CacheEntry, CacheResult, Cacheable, Transport};
use crate::error::{Error, Result};

/// Runs one logical GET through a [`Transport`], keeping a [`CacheStorage`]
/// in step with the server via `If-None-Match`.
///
/// 1. Look the target up in storage
/// 2. If present, send its validator along with the request
/// 3. On 304, hand back the cached value untouched
/// 4. Otherwise decode the body, store it with its new validator, return it
///
/// Failures (network, unexpected status, bad body) never touch storage.
pub struct FetchPipeline<X> {
  transport: X,
}

impl<X: Transport> FetchPipeline<X> {
  pub fn new(transport: X) -> Self {
    Self { transport }
  }

  #[cfg(test)]
  pub fn transport(&self) -> &X {
    &self.transport
  }

  /// Fetch `target`, using `storage` for conditional validation.
  ///
  /// `target` must already be canonical: it is both the request target and
  /// the cache key.
  pub async fn fetch<T, S>(&self, target: &str, storage: &S) -> Result<CacheResult<T>>
  where
    T: Cacheable,
    S: CacheStorage<T>,
  {
    let cached = storage.get(target);
    if cached.is_none() {
      debug!(endpoint = %target, "item not present in cache");
    }

    let validator = cached.as_ref().map(|entry| entry.validator.as_str());
    let response = self.transport.get(target, validator).await?;

    if response.status == StatusCode::NOT_MODIFIED {
      return match cached {
        Some(entry) => {
          debug!(endpoint = %target, "not modified, using cached response");
          Ok(CacheResult::validated(entry.value))
        }
        // We never sent a validator, so a 304 makes no sense here.
        None => Err(Error::Upstream {
          status: response.status.as_u16(),
        }),
      };
    }

    if !response.status.is_success() {
      return Err(Error::Upstream {
        status: response.status.as_u16(),
      });
    }

    let value: T = serde_json::from_slice(&response.body)?;

    let validator = response
      .validator
      .or_else(|| value.validator().map(String::from));

    match validator {
      Some(validator) => {
        debug!(endpoint = %target, %validator, "storing cache");
        storage.put(
          target,
          CacheEntry {
            key: target.to_string(),
            value: value.clone(),
            validator,
          },
        );
      }
      None => debug!(endpoint = %target, "response carried no validator, not caching"),
    }

    Ok(CacheResult::from_network(value))
  }
}
