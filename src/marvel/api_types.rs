//! Serde-deserializable types matching Marvel API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;

use crate::cache::Cacheable;
use crate::error::{Error, Result};

use super::types::{Comic, ComicId, Page, Series, Url};

// ============================================================================
// Response envelope
// ============================================================================

/// Outer wrapper of every Marvel response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataWrapper<T> {
  /// Sometimes a number, sometimes a string
  #[serde(default)]
  pub code: serde_json::Value,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub attribution_text: String,
  #[serde(default)]
  pub etag: Option<String>,
  pub data: DataContainer<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataContainer<T> {
  #[serde(default)]
  pub offset: u32,
  #[serde(default)]
  pub limit: u32,
  #[serde(default)]
  pub total: u32,
  #[serde(default)]
  pub count: u32,
  #[serde(default = "Vec::new")]
  pub results: Vec<T>,
}

impl<T> Cacheable for DataWrapper<T>
where
  T: Clone + Send + Sync + serde::de::DeserializeOwned,
{
  fn validator(&self) -> Option<&str> {
    self.etag.as_deref()
  }
}

// ============================================================================
// Common nested field types
// ============================================================================

/// Reference to another resource, e.g. a comic inside a series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiItem {
  #[serde(default)]
  pub name: String,
  #[serde(rename = "resourceURI")]
  pub resource_uri: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ApiCollection {
  #[serde(default)]
  pub items: Vec<ApiItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiUrl {
  #[serde(rename = "type")]
  pub kind: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiDate {
  #[serde(rename = "type")]
  pub kind: String,
  pub date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ApiThumbnail {
  #[serde(default)]
  pub path: String,
  #[serde(default)]
  pub extension: String,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComic {
  pub id: ComicId,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub urls: Vec<ApiUrl>,
  #[serde(default)]
  pub thumbnail: ApiThumbnail,
  #[serde(default)]
  pub format: String,
  #[serde(default)]
  pub issue_number: u32,
  pub series: ApiItem,
  #[serde(default)]
  pub dates: Vec<ApiDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeries {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub urls: Vec<ApiUrl>,
  #[serde(default)]
  pub thumbnail: ApiThumbnail,
  #[serde(default)]
  pub comics: ApiCollection,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiUrl> for Url {
  fn from(u: ApiUrl) -> Self {
    Url {
      kind: u.kind,
      url: u.url,
    }
  }
}

impl ApiThumbnail {
  fn portrait_url(&self) -> String {
    format!("{}/portrait_uncanny.{}", self.path, self.extension)
  }
}

impl ApiComic {
  pub fn into_comic(self, attribution: &str) -> Result<Comic> {
    let series_id = extract_id(&self.series.resource_uri)?;

    let on_sale_date = self
      .dates
      .iter()
      .rev()
      .find(|d| d.kind.eq_ignore_ascii_case("onsaleDate"))
      .map(|d| d.date.clone())
      .unwrap_or_default();

    Ok(Comic {
      id: self.id,
      title: self.title,
      issue_number: self.issue_number,
      format: self.format,
      series_id,
      on_sale_date,
      urls: self.urls.into_iter().map(Url::from).collect(),
      thumbnail_url: self.thumbnail.portrait_url(),
      attribution: attribution.to_string(),
    })
  }
}

impl ApiSeries {
  /// Ids of every comic this series references, in upstream order.
  pub fn comic_ids(&self) -> Result<Vec<ComicId>> {
    self
      .comics
      .items
      .iter()
      .map(|item| extract_id(&item.resource_uri))
      .collect()
  }

  /// Build the series without its comics; those are resolved separately.
  pub fn into_series(self, attribution: &str) -> Series {
    Series {
      id: self.id,
      title: self.title,
      urls: self.urls.into_iter().map(Url::from).collect(),
      thumbnail_url: self.thumbnail.portrait_url(),
      comics: Vec::new(),
      attribution: attribution.to_string(),
    }
  }
}

impl DataWrapper<ApiComic> {
  /// Convert the envelope into a page of comics.
  ///
  /// `count` is taken from the results actually present, not from upstream.
  pub fn into_page(self) -> Result<Page<Comic>> {
    let attribution = self.attribution_text;
    let data = self.data;

    let results = data
      .results
      .into_iter()
      .map(|comic| comic.into_comic(&attribution))
      .collect::<Result<Vec<_>>>()?;

    Ok(Page {
      total: data.total,
      limit: data.limit,
      offset: data.offset,
      count: results.len() as u32,
      results,
    })
  }
}

/// Pull the numeric id out of a resource URI's trailing path segment,
/// e.g. `http://gateway.marvel.com/v1/public/comics/4242` gives `4242`.
pub fn extract_id(resource_uri: &str) -> Result<u64> {
  resource_uri
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .and_then(|segment| segment.parse().ok())
    .ok_or_else(|| Error::InvalidResourceUri(resource_uri.to_string()))
}
