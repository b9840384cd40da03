//! Shared test doubles: a scripted transport and a controllable clock.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
  config::Config,
  prelude::*,
  sv::{
    WalletClient,
    transport::{Method, Reply, Transport},
  },
  utils::Clock,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
}

impl Call {
  pub fn param(&self, name: &str) -> Option<&str> {
    self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
  }
}

#[derive(Debug, Clone)]
enum Canned {
  Json(Reply),
  /// A body that is not JSON.
  Raw { status: u16, body: String },
}

/// Answers each path from a queue of canned replies. The last reply of a
/// queue is repeated forever.
#[derive(Default)]
pub struct ScriptedTransport {
  replies: DashMap<String, VecDeque<Canned>>,
  calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn reply(&self, path: &str, payload: Value) -> &Self {
    self.reply_status(path, 200, payload)
  }

  pub fn reply_status(&self, path: &str, status: u16, payload: Value) -> &Self {
    self.push(path, Canned::Json(Reply { status, payload }))
  }

  pub fn reply_raw(&self, path: &str, status: u16, body: &str) -> &Self {
    self.push(path, Canned::Raw { status, body: body.to_string() })
  }

  fn push(&self, path: &str, canned: Canned) -> &Self {
    self.replies.entry(path.to_string()).or_default().push_back(canned);
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn calls_to(&self, path: &str) -> Vec<Call> {
    self.calls().into_iter().filter(|c| c.path == path).collect()
  }
}

#[async_trait]
impl Transport for ScriptedTransport {
  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Reply> {
    self.calls.lock().unwrap().push(Call {
      method,
      path: path.to_string(),
      query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
    });

    let reply = match self.replies.get_mut(path) {
      Some(mut queue) if queue.len() > 1 => queue.pop_front(),
      Some(queue) => queue.front().cloned(),
      None => None,
    };

    match reply {
      Some(Canned::Json(reply)) => Ok(reply),
      Some(Canned::Raw { status, body }) => Err(Error::UnexpectedResponse {
        endpoint: path.to_string(),
        status,
        body,
      }),
      None => Ok(Reply {
        status: 404,
        payload: json::json!({"error": format!("unscripted path {path}")}),
      }),
    }
  }
}

/// Clock that moves forward by `step` every time it is read.
pub struct TestClock {
  now: Mutex<DateTime<Utc>>,
  step: TimeDelta,
}

impl TestClock {
  pub fn fixed(now: DateTime<Utc>) -> Self {
    Self::stepping(now, TimeDelta::zero())
  }

  pub fn stepping(now: DateTime<Utc>, step: TimeDelta) -> Self {
    Self { now: Mutex::new(now), step }
  }
}

impl Clock for TestClock {
  fn now(&self) -> DateTime<Utc> {
    let mut now = self.now.lock().unwrap();
    let current = *now;
    *now += self.step;
    current
  }
}

pub fn config() -> Config {
  Config::new("test-key").request_delay(Duration::ZERO)
}

pub fn client(transport: &Arc<ScriptedTransport>) -> WalletClient {
  init_tracing();
  WalletClient::with_transport(config(), transport.clone())
}

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}
