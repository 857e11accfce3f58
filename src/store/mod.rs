//! File-backed store of which series each user follows.
//!
//! The whole map lives in memory behind a readers/writer lock. A background
//! task snapshots it to a JSON file on a fixed interval, and `shutdown` writes
//! one last snapshot before releasing the file.
//!
//! Snapshots truncate and rewrite the file in place, so a crash part way
//! through a write can leave it incomplete.

mod user;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use crate::marvel::types::SeriesId;

pub use user::{User, UserId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("store file error: {0}")]
  Io(#[from] std::io::Error),

  #[error("could not serialize store: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("no user with id: {user_id}")]
  RelationNotFound { user_id: UserId },

  #[error("flush task failed: {0}")]
  FlushTask(#[from] tokio::task::JoinError),
}

type Followed = BTreeMap<UserId, User>;

/// State shared with the background flush task.
struct Shared {
  followed: RwLock<Followed>,
  /// Held for the whole snapshot so concurrent flushes land in order
  file: Mutex<File>,
  path: PathBuf,
}

impl Shared {
  fn flush(&self) -> Result<()> {
    let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

    let snapshot = {
      let followed = self.followed.read().unwrap_or_else(PoisonError::into_inner);
      serde_json::to_vec(&*followed)?
    };

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&snapshot)?;
    file.flush()?;
    file.sync_data()?;

    debug!(path = %self.path.display(), bytes = snapshot.len(), "db saved");
    Ok(())
  }
}

/// Follow/unfollow state for all users, persisted to a single JSON file.
pub struct FollowStore {
  shared: Arc<Shared>,
  flusher: JoinHandle<()>,
  /// Stops the flush task if the store is dropped without `shutdown`
  cancel: DropGuard,
}

impl FollowStore {
  /// Open the store at `path`, creating the file if needed, and start the
  /// periodic flush. Must be called from within a tokio runtime.
  ///
  /// An empty or unreadable-as-JSON file starts the store empty; only I/O
  /// failures are errors.
  pub fn open(path: impl AsRef<Path>, flush_interval: Duration) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let (file, followed) = load(&path)?;

    info!(
      path = %path.display(),
      users = followed.len(),
      "opened follow store"
    );

    let shared = Arc::new(Shared {
      followed: RwLock::new(followed),
      file: Mutex::new(file),
      path,
    });

    let token = CancellationToken::new();
    let flusher = spawn_flusher(Arc::clone(&shared), token.clone(), flush_interval);

    Ok(Self {
      shared,
      flusher,
      cancel: token.drop_guard(),
    })
  }

  /// Follow a series. Following twice is the same as following once.
  pub fn follow(&self, user_id: UserId, series_id: SeriesId) {
    let mut followed = self.write();
    let user = followed
      .entry(user_id)
      .or_insert_with(|| User::new(user_id));

    if user.following.insert(series_id) {
      debug!(user_id, series_id, "followed series");
    }
  }

  /// Unfollow a series. Unknown users and series are ignored.
  pub fn unfollow(&self, user_id: UserId, series_id: SeriesId) {
    let mut followed = self.write();
    if let Some(user) = followed.get_mut(&user_id) {
      if user.following.remove(&series_id) {
        debug!(user_id, series_id, "unfollowed series");
      }
    }
  }

  pub fn is_following(&self, user_id: UserId, series_id: SeriesId) -> bool {
    self
      .read()
      .get(&user_id)
      .is_some_and(|user| user.is_following(series_id))
  }

  /// Every series a user follows.
  pub fn list_followed(&self, user_id: UserId) -> Result<BTreeSet<SeriesId>> {
    self
      .read()
      .get(&user_id)
      .map(|user| user.following.clone())
      .ok_or(Error::RelationNotFound { user_id })
  }

  /// Write a snapshot now, outside the regular interval.
  pub fn flush(&self) -> Result<()> {
    self.shared.flush()
  }

  /// Stop the flush task, write a final snapshot and close the file.
  pub async fn shutdown(self) -> Result<()> {
    debug!("shutting down db");

    self.cancel.disarm().cancel();
    self.flusher.await?;

    let shared = self.shared;
    tokio::task::spawn_blocking(move || shared.flush()).await??;

    info!("follow store closed");
    Ok(())
  }

  fn read(&self) -> std::sync::RwLockReadGuard<'_, Followed> {
    self
      .shared
      .followed
      .read()
      .unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> std::sync::RwLockWriteGuard<'_, Followed> {
    self
      .shared
      .followed
      .write()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

/// Open (or create) the backing file and read whatever it holds.
fn load(path: &Path) -> Result<(File, Followed)> {
  let mut file = match OpenOptions::new().read(true).write(true).open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
      }
      debug!(path = %path.display(), "creating store file");
      let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)?;
      return Ok((file, Followed::new()));
    }
    Err(e) => return Err(e.into()),
  };

  let mut contents = String::new();
  file.read_to_string(&mut contents)?;

  if contents.trim().is_empty() {
    return Ok((file, Followed::new()));
  }

  let followed = match serde_json::from_str(&contents) {
    Ok(followed) => followed,
    Err(e) => {
      warn!(
        path = %path.display(),
        error = %e,
        "store file is not valid, starting empty"
      );
      Followed::new()
    }
  };

  Ok((file, followed))
}

fn spawn_flusher(
  shared: Arc<Shared>,
  token: CancellationToken,
  every: Duration,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        _ = token.cancelled() => break,
        _ = ticker.tick() => {
          let shared = Arc::clone(&shared);
          match tokio::task::spawn_blocking(move || shared.flush()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "db save error"),
            Err(e) => error!(error = %e, "db save task panicked"),
          }
        }
      }
    }

    debug!("flush task stopped");
  })
}
