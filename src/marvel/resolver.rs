//! Marvel client that resolves domain resources through the fetch pipeline.

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::cache::{FetchPipeline, Storage, Transport};
use crate::config::MarvelConfig;
use crate::error::{Error, Result};

use super::api_types::{ApiComic, ApiSeries, DataWrapper};
use super::auth::Credentials;
use super::client::MarvelHttp;
use super::query::MarvelQuery;
use super::release::ReleaseWindow;
use super::types::{Comic, ComicId, Page, Series, SeriesId};
use super::{ComicService, SeriesService};

/// Marvel client with transparent ETag caching.
///
/// Comics and series are cached separately, keyed by request target.
/// Dropping any returned future cancels its outstanding requests.
pub struct MarvelClient<X> {
  pipeline: FetchPipeline<X>,
  comics: Storage<DataWrapper<ApiComic>>,
  series: Storage<DataWrapper<ApiSeries>>,
  date_layout: String,
  release_offset: i32,
}

impl MarvelClient<MarvelHttp> {
  /// Create a client talking to the configured Marvel endpoint.
  pub fn new(config: &MarvelConfig, credentials: Credentials) -> Result<Self> {
    let http = MarvelHttp::new(config, credentials)?;
    Ok(Self::with_transport(http, config))
  }
}

impl<X: Transport> MarvelClient<X> {
  pub fn with_transport(transport: X, config: &MarvelConfig) -> Self {
    Self {
      pipeline: FetchPipeline::new(transport),
      comics: Storage::new(config.cache_enabled),
      series: Storage::new(config.cache_enabled),
      date_layout: config.date_layout.clone(),
      release_offset: config.release_offset,
    }
  }

  async fn fetch_comics(&self, query: &MarvelQuery) -> Result<DataWrapper<ApiComic>> {
    let target = query.target(&self.date_layout);
    let result = self.pipeline.fetch(&target, &self.comics).await?;
    debug!(query = %query.description(), source = ?result.source, "fetched comics");
    Ok(result.data)
  }

  async fn fetch_series(&self, query: &MarvelQuery) -> Result<DataWrapper<ApiSeries>> {
    let target = query.target(&self.date_layout);
    let result = self.pipeline.fetch(&target, &self.series).await?;
    debug!(query = %query.description(), source = ?result.source, "fetched series");
    Ok(result.data)
  }
}

impl<X: Transport> ComicService for MarvelClient<X> {
  async fn get_comic(&self, id: ComicId) -> Result<Comic> {
    let wrapper = self.fetch_comics(&MarvelQuery::Comic { id }).await?;

    let comic = wrapper
      .data
      .results
      .into_iter()
      .next()
      .ok_or(Error::NotFound { kind: "comic", id })?;

    comic.into_comic(&wrapper.attribution_text)
  }

  async fn weekly_comics(&self, date: NaiveDate) -> Result<Page<Comic>> {
    let window =
      ReleaseWindow::for_date(date, self.release_offset).ok_or(Error::InvalidDate(date))?;
    info!(%date, start = %window.start, end = %window.end, "weekly comics");

    let query = MarvelQuery::WeeklyComics {
      start: window.start,
      end: window.end,
    };
    self.fetch_comics(&query).await?.into_page()
  }

  async fn comics_within_series(&self, id: SeriesId) -> Result<Vec<Comic>> {
    let page = self
      .fetch_comics(&MarvelQuery::SeriesComics { id })
      .await?
      .into_page()?;
    Ok(page.results)
  }
}

impl<X: Transport> SeriesService for MarvelClient<X> {
  async fn get_series(&self, id: SeriesId) -> Result<Series> {
    let wrapper = self.fetch_series(&MarvelQuery::Series { id }).await?;
    let attribution = wrapper.attribution_text;

    let api_series = wrapper
      .data
      .results
      .into_iter()
      .next()
      .ok_or(Error::NotFound { kind: "series", id })?;

    let comic_ids = api_series.comic_ids()?;
    let mut series = api_series.into_series(&attribution);

    debug!(series_id = id, comics = comic_ids.len(), "resolving series comics");

    // One request per referenced comic. The first failure drops the rest.
    let fetches = comic_ids
      .into_iter()
      .map(|comic_id| self.get_comic(comic_id));
    let comics = try_join_all(fetches).await?;

    series.comics = comics
      .into_iter()
      .map(|comic| Comic {
        attribution: attribution.clone(),
        ..comic
      })
      .collect();

    Ok(series)
  }
}
