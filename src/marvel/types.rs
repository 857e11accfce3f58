use serde::{Deserialize, Serialize};

pub type ComicId = u64;
pub type SeriesId = u64;

/// A link to the comic or series on the publisher's site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
  #[serde(rename = "type")]
  pub kind: String,
  pub url: String,
}

/// A single comic issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comic {
  pub id: ComicId,
  pub title: String,
  pub issue_number: u32,
  pub format: String,
  pub series_id: SeriesId,
  /// Raw upstream date string, empty when no on-sale date was listed
  pub on_sale_date: String,
  pub urls: Vec<Url>,
  pub thumbnail_url: String,
  pub attribution: String,
}

/// A series with its comics resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
  pub id: SeriesId,
  pub title: String,
  pub urls: Vec<Url>,
  pub thumbnail_url: String,
  /// Not in upstream order
  pub comics: Vec<Comic>,
  pub attribution: String,
}

/// Pagination envelope for collection endpoints.
///
/// `count` always equals `results.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub total: u32,
  pub limit: u32,
  pub offset: u32,
  pub count: u32,
  pub results: Vec<T>,
}
