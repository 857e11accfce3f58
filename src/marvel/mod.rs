//! Marvel catalog client.
//!
//! Consumers depend on the two narrow capabilities below rather than on
//! [`MarvelClient`] directly.

mod api_types;
mod auth;
mod client;
mod query;
mod release;
mod resolver;
pub mod types;

use chrono::NaiveDate;
use std::future::Future;

use crate::error::Result;
use types::{Comic, ComicId, Page, Series, SeriesId};

pub use auth::Credentials;
pub use resolver::MarvelClient;

/// Single comic and comic collection retrieval.
pub trait ComicService: Send + Sync {
  /// Fetch one comic, failing with `NotFound` when upstream has none.
  fn get_comic(&self, id: ComicId) -> impl Future<Output = Result<Comic>> + Send;

  /// Comics released in the week `date` falls in, shifted by the release lag.
  fn weekly_comics(&self, date: NaiveDate) -> impl Future<Output = Result<Page<Comic>>> + Send;

  /// Every comic listed under a series, in one collection request.
  fn comics_within_series(&self, id: SeriesId)
    -> impl Future<Output = Result<Vec<Comic>>> + Send;
}

/// Series retrieval with comics resolved.
pub trait SeriesService: Send + Sync {
  fn get_series(&self, id: SeriesId) -> impl Future<Output = Result<Series>> + Send;
}
