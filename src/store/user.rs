use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::marvel::types::SeriesId;

pub type UserId = u64;

/// A user and the series they follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: UserId,
  #[serde(default)]
  pub following: BTreeSet<SeriesId>,
}

impl User {
  pub fn new(id: UserId) -> Self {
    Self {
      id,
      following: BTreeSet::new(),
    }
  }

  pub fn is_following(&self, series_id: SeriesId) -> bool {
    self.following.contains(&series_id)
  }
}
