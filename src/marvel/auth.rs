//! Request signing for the Marvel public API.

use chrono::Utc;
use md5::{Digest, Md5};
use url::Url;

/// Public/private key pair issued by the Marvel developer portal.
#[derive(Clone)]
pub struct Credentials {
  pub public_key: String,
  pub private_key: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("public_key", &self.public_key)
      .finish_non_exhaustive()
  }
}

impl Credentials {
  /// Append `ts`, `hash` and `apikey` to the query string.
  ///
  /// Must run last, once the URL points at its final location.
  pub fn sign(&self, url: &mut Url) {
    self.sign_at(url, Utc::now().timestamp());
  }

  fn sign_at(&self, url: &mut Url, ts: i64) {
    let ts = ts.to_string();
    url
      .query_pairs_mut()
      .append_pair("ts", &ts)
      .append_pair("hash", &self.hash(&ts))
      .append_pair("apikey", &self.public_key);
  }

  fn hash(&self, ts: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(ts.as_bytes());
    hasher.update(self.private_key.as_bytes());
    hasher.update(self.public_key.as_bytes());
    hex::encode(hasher.finalize())
  }
}
