//! Canonical request targets for Marvel API calls.
//!
//! A target doubles as the cache key, so it must come out byte-for-byte the
//! same for the same logical query.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use url::form_urlencoded;

use super::types::{ComicId, SeriesId};

/// Filters shared by every comic collection query.
const COMIC_FILTERS: &[(&str, &str)] = &[
  ("format", "comic"),
  ("formatType", "comic"),
  ("noVariants", "true"),
  ("hasDigitalIssue", "true"),
  ("orderBy", "issueNumber"),
  ("limit", "100"),
];

/// Query key types for Marvel API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarvelQuery {
  /// A single comic
  Comic { id: ComicId },
  /// A single series
  Series { id: SeriesId },
  /// Comics released in the inclusive date range
  WeeklyComics { start: NaiveDate, end: NaiveDate },
  /// Comics belonging to a series
  SeriesComics { id: SeriesId },
}

impl MarvelQuery {
  /// The request target (path and canonical query), relative to the API base.
  pub fn target(&self, date_layout: &str) -> String {
    match self {
      Self::Comic { id } => format!("/comics/{}", id),
      Self::Series { id } => format!("/series/{}", id),
      Self::WeeklyComics { start, end } => {
        let range = format!(
          "{},{}",
          start.format(date_layout),
          end.format(date_layout)
        );
        with_query("/comics", comic_filters([("dateRange", range)]))
      }
      Self::SeriesComics { id } => {
        with_query(&format!("/series/{}/comics", id), comic_filters([]))
      }
    }
  }

  pub fn description(&self) -> String {
    match self {
      Self::Comic { id } => format!("comic {}", id),
      Self::Series { id } => format!("series {}", id),
      Self::WeeklyComics { start, end } => format!("comics released {} to {}", start, end),
      Self::SeriesComics { id } => format!("comics in series {}", id),
    }
  }
}

fn comic_filters<const N: usize>(extra: [(&str, String); N]) -> BTreeMap<String, String> {
  COMIC_FILTERS
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .chain(extra.into_iter().map(|(k, v)| (k.to_string(), v)))
    .collect()
}

/// Append parameters in key order so equal maps render to equal strings.
fn with_query(path: &str, params: BTreeMap<String, String>) -> String {
  let query = form_urlencoded::Serializer::new(String::new())
    .extend_pairs(params.iter())
    .finish();
  format!("{}?{}", path, query)
}
