use reqwest::header::{ETAG, IF_NONE_MATCH};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::cache::{RawResponse, Transport};
use crate::config::MarvelConfig;
use crate::error::Result;

use super::auth::Credentials;

/// HTTP transport for the Marvel API.
///
/// Each request target is joined onto the configured base URL, then signed.
#[derive(Clone)]
pub struct MarvelHttp {
  client: reqwest::Client,
  base_url: Url,
  credentials: Credentials,
}

impl MarvelHttp {
  pub fn new(config: &MarvelConfig, credentials: Credentials) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    Ok(Self {
      client,
      base_url: Url::parse(&config.base_url)?,
      credentials,
    })
  }
}

impl Transport for MarvelHttp {
  async fn get(&self, target: &str, validator: Option<&str>) -> Result<RawResponse> {
    let mut url = join_target(&self.base_url, target);
    debug!(url = %url, "sending to");
    self.credentials.sign(&mut url);

    let mut request = self.client.get(url);
    if let Some(validator) = validator {
      request = request.header(IF_NONE_MATCH, validator);
    }

    let response = request.send().await?;
    let status = response.status();
    let validator = response
      .headers()
      .get(ETAG)
      .and_then(|v| v.to_str().ok())
      .map(String::from);
    let body = response.bytes().await?;

    Ok(RawResponse {
      status,
      validator,
      body,
    })
  }
}

/// Resolve a target like `/comics?limit=100` against the base URL.
///
/// Targets already carrying the base path are left as they are.
fn join_target(base_url: &Url, target: &str) -> Url {
  let base_path = base_url.path().trim_end_matches('/');
  let (path, query) = match target.split_once('?') {
    Some((path, query)) => (path, Some(query)),
    None => (target, None),
  };

  let mut url = base_url.clone();
  if !base_path.is_empty() && path.starts_with(base_path) {
    url.set_path(path);
  } else {
    url.set_path(&format!("{}/{}", base_path, path.trim_start_matches('/')));
  }
  url.set_query(query);
  url
}
