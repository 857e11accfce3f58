//! Errors raised while talking to the upstream catalog.

use chrono::NaiveDate;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The request never produced a response (connect, timeout, reset...).
  #[error("network error: {0}")]
  Network(#[source] BoxError),

  /// The upstream answered with a status other than 2xx or 304.
  #[error("upstream responded with status {status}")]
  Upstream { status: u16 },

  #[error("could not decode upstream response: {0}")]
  Decode(#[from] serde_json::Error),

  /// A single resource was asked for and the upstream collection was empty.
  #[error("could not find {kind} with id {id}")]
  NotFound { kind: &'static str, id: u64 },

  #[error("could not extract a valid id from: {0}")]
  InvalidResourceUri(String),

  #[error("invalid base url: {0}")]
  InvalidBaseUrl(#[from] url::ParseError),

  #[error("release window for {0} is out of range")]
  InvalidDate(NaiveDate),
}

impl Error {
  pub fn network(err: impl Into<BoxError>) -> Self {
    Self::Network(err.into())
  }
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    Self::network(err)
  }
}
