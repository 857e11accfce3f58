use chrono::format::{Item, StrftimeItems};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::marvel::Credentials;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub marvel: MarvelConfig,
  pub store: StoreConfig,
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarvelConfig {
  /// API root every request path is joined onto
  pub base_url: String,
  pub timeout_secs: u64,
  /// strftime layout used in `dateRange` queries
  pub date_layout: String,
  /// Months between print release and availability, usually negative
  pub release_offset: i32,
  /// Turn off ETag caching entirely
  pub cache_enabled: bool,
}

impl Default for MarvelConfig {
  fn default() -> Self {
    Self {
      base_url: "https://gateway.marvel.com/v1/public".to_string(),
      timeout_secs: 20,
      date_layout: "%Y-%m-%d".to_string(),
      release_offset: -3,
      cache_enabled: true,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub filename: PathBuf,
  pub flush_interval_secs: u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      filename: PathBuf::from("db.json"),
      flush_interval_secs: 30,
    }
  }
}

impl StoreConfig {
  pub fn flush_interval(&self) -> Duration {
    Duration::from_secs(self.flush_interval_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Filter directive, overridden by RUST_LOG
  pub level: String,
  /// Write logs to this file instead of stderr
  pub file: Option<PathBuf>,
  pub disabled: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "debug".to_string(),
      file: None,
      disabled: false,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./comicshelf.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/comicshelf/config.yaml
  ///
  /// With no file found the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("comicshelf.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("comicshelf").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  fn validate(&self) -> Result<()> {
    Url::parse(&self.marvel.base_url)
      .map_err(|e| eyre!("Invalid marvel.base_url {}: {}", self.marvel.base_url, e))?;
    if StrftimeItems::new(&self.marvel.date_layout).any(|item| item == Item::Error) {
      return Err(eyre!(
        "Invalid marvel.date_layout: {}",
        self.marvel.date_layout
      ));
    }
    if self.store.flush_interval_secs == 0 {
      return Err(eyre!("store.flush_interval_secs must be greater than zero"));
    }
    Ok(())
  }

  /// Get the Marvel API keys from environment variables.
  ///
  /// Checks COMICSHELF_MARVEL_PUBLIC_KEY / COMICSHELF_MARVEL_PRIVATE_KEY
  /// first, then MARVEL_PUBLIC_KEY / MARVEL_PRIVATE_KEY as fallback.
  pub fn get_credentials() -> Result<Credentials> {
    let public_key = env_var("COMICSHELF_MARVEL_PUBLIC_KEY", "MARVEL_PUBLIC_KEY")?;
    let private_key = env_var("COMICSHELF_MARVEL_PRIVATE_KEY", "MARVEL_PRIVATE_KEY")?;

    Ok(Credentials {
      public_key,
      private_key,
    })
  }
}

fn env_var(primary: &str, fallback: &str) -> Result<String> {
  std::env::var(primary)
    .or_else(|_| std::env::var(fallback))
    .map_err(|_| eyre!("Marvel API key not found. Set {} or {}.", primary, fallback))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_file_gives_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.marvel.release_offset, -3);
    assert_eq!(config.marvel.timeout_secs, 20);
    assert_eq!(config.store.filename, PathBuf::from("db.json"));
    assert_eq!(config.store.flush_interval(), Duration::from_secs(30));
    assert!(config.marvel.cache_enabled);
  }

  #[test]
  fn test_partial_override() {
    let config = Config::parse(
      r#"
marvel:
  release_offset: -2
  base_url: "http://localhost:9000/v1/public"
store:
  filename: /tmp/follows.json
logging:
  level: info
"#,
    )
    .unwrap();

    assert_eq!(config.marvel.release_offset, -2);
    assert_eq!(config.marvel.base_url, "http://localhost:9000/v1/public");
    assert!(config.validate().is_ok());
    assert_eq!(config.marvel.date_layout, "%Y-%m-%d");
    assert_eq!(config.store.filename, PathBuf::from("/tmp/follows.json"));
    assert_eq!(config.store.flush_interval_secs, 30);
    assert_eq!(config.logging.level, "info");
  }

  #[test]
  fn test_rejects_bad_date_layout() {
    let config = Config::parse("marvel:\n  date_layout: \"%Y-%!\"\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_rejects_bad_base_url() {
    let config = Config::parse("marvel:\n  base_url: not a url\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_rejects_zero_flush_interval() {
    let config = Config::parse("store:\n  flush_interval_secs: 0\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/comicshelf.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
