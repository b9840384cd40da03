use std::time::Duration;

use json::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("service error at `{endpoint}`: {payload}")]
  Service { endpoint: String, payload: Value },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("failed to decode response from `{endpoint}`: {source}")]
  Decode {
    endpoint: String,
    #[source]
    source: json::Error,
  },

  #[error("unexpected response from `{endpoint}` ({status}): {body}")]
  UnexpectedResponse { endpoint: String, status: u16, body: String },

  #[error("gave up after {attempts} attempt(s) in {elapsed:?}")]
  Deadline { attempts: u32, elapsed: Duration },

  #[error("config error: {0}")]
  Config(String),
}

impl Error {
  pub fn service(endpoint: &str, payload: Value) -> Self {
    Self::Service { endpoint: endpoint.to_string(), payload }
  }

  pub fn decode(endpoint: &str, source: json::Error) -> Self {
    Self::Decode { endpoint: endpoint.to_string(), source }
  }

  /// Raw service payload, if this error carries one.
  pub fn payload(&self) -> Option<&Value> {
    match self {
      Self::Service { payload, .. } => Some(payload),
      _ => None,
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound(_))
  }
}
