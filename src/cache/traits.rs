//! Core traits and types for the conditional caching system.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;

use crate::error::Result;

/// Trait for decoded responses that can be cached.
///
/// A response may carry its own validator in the body. The pipeline prefers
/// the `ETag` header and only falls back to this when the header is missing.
pub trait Cacheable: Clone + Send + Sync + DeserializeOwned {
  fn validator(&self) -> Option<&str> {
    None
  }
}

/// The last full response seen for a request target, with its validator.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
  pub key: String,
  pub value: T,
  /// Matches the version of `value`, always replaced together with it.
  pub validator: String,
}

/// A response as handed back by a [`Transport`], before decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: StatusCode,
  /// Value of the `ETag` header, if the server sent one
  pub validator: Option<String>,
  pub body: Bytes,
}

impl RawResponse {
  pub fn not_modified() -> Self {
    Self {
      status: StatusCode::NOT_MODIFIED,
      validator: None,
      body: Bytes::new(),
    }
  }
}

/// The outbound side of the fetch pipeline.
///
/// `target` is the canonical request target (path plus query). When
/// `validator` is set the implementation must send it as `If-None-Match`.
pub trait Transport: Send + Sync {
  fn get(
    &self,
    target: &str,
    validator: Option<&str>,
  ) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from a full network response.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  /// Create a new cache result from an entry the server confirmed unchanged.
  pub fn validated(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Validated,
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Full body decoded from the network
  Network,
  /// Server answered 304, cached value reused
  Validated,
}
