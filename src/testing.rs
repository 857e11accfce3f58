//! In-memory transport for exercising the fetch path without a network.

use bytes::Bytes;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::cache::{RawResponse, Transport};
use crate::error::{Error, Result};

#[derive(Clone)]
enum Reply {
  Response(RawResponse),
  Fail,
}

#[derive(Clone)]
struct Scripted {
  reply: Reply,
  delay: Option<Duration>,
}

/// Replies are queued per target; the last one queued keeps repeating.
/// Unknown targets answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
  routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
  calls: Mutex<Vec<(String, Option<String>)>>,
  completed: AtomicUsize,
}

impl ScriptedTransport {
  pub fn new() -> Self {
    Self::default()
  }

  fn push(&self, target: &str, scripted: Scripted) {
    self
      .routes
      .lock()
      .unwrap()
      .entry(target.to_string())
      .or_default()
      .push_back(scripted);
  }

  pub fn respond(&self, target: &str, status: u16, etag: Option<&str>, body: &str) {
    self.respond_after(target, None, status, etag, body);
  }

  pub fn respond_after(
    &self,
    target: &str,
    delay: Option<Duration>,
    status: u16,
    etag: Option<&str>,
    body: &str,
  ) {
    self.push(
      target,
      Scripted {
        reply: Reply::Response(RawResponse {
          status: StatusCode::from_u16(status).unwrap(),
          validator: etag.map(String::from),
          body: Bytes::from(body.to_string()),
        }),
        delay,
      },
    );
  }

  pub fn not_modified(&self, target: &str) {
    self.push(
      target,
      Scripted {
        reply: Reply::Response(RawResponse::not_modified()),
        delay: None,
      },
    );
  }

  pub fn fail(&self, target: &str) {
    self.push(
      target,
      Scripted {
        reply: Reply::Fail,
        delay: None,
      },
    );
  }

  /// Every request seen so far, as (target, validator).
  pub fn calls(&self) -> Vec<(String, Option<String>)> {
    self.calls.lock().unwrap().clone()
  }

  /// Requests that ran to completion (were not dropped mid-flight).
  pub fn completed(&self) -> usize {
    self.completed.load(Ordering::SeqCst)
  }

  fn next(&self, target: &str) -> Option<Scripted> {
    let mut routes = self.routes.lock().unwrap();
    let queue = routes.get_mut(target)?;
    if queue.len() > 1 {
      queue.pop_front()
    } else {
      queue.front().cloned()
    }
  }
}

impl Transport for ScriptedTransport {
  async fn get(&self, target: &str, validator: Option<&str>) -> Result<RawResponse> {
    self
      .calls
      .lock()
      .unwrap()
      .push((target.to_string(), validator.map(String::from)));

    let scripted = self.next(target);

    if let Some(delay) = scripted.as_ref().and_then(|s| s.delay) {
      tokio::time::sleep(delay).await;
    }
    self.completed.fetch_add(1, Ordering::SeqCst);

    match scripted.map(|s| s.reply) {
      Some(Reply::Response(response)) => Ok(response),
      Some(Reply::Fail) => Err(Error::network(format!("connection refused: {}", target))),
      None => Ok(RawResponse {
        status: StatusCode::NOT_FOUND,
        validator: None,
        body: Bytes::new(),
      }),
    }
  }
}
