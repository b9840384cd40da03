use std::{fmt, str::FromStr};

use async_trait::async_trait;
use reqwest::{
  Client, Url,
  header::{HeaderMap, HeaderValue},
};
use serde::de::{DeserializeOwned, Error as _};

use crate::{config::Config, prelude::*, utils::truthy};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "api-key";

/// Keys a list endpoint may wrap its array in.
const LIST_KEYS: [&str; 5] = ["data", "items", "invoices", "cheques", "coins"];

/// HTTP verbs the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Delete,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Delete => "DELETE",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Method {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "get" => Ok(Self::Get),
      "post" => Ok(Self::Post),
      "delete" => Ok(Self::Delete),
      _ => Err(Error::InvalidArgument(format!(
        "expected \"get\", \"post\" or \"delete\", not {s:?}"
      ))),
    }
  }
}

impl TryFrom<reqwest::Method> for Method {
  type Error = Error;

  fn try_from(method: reqwest::Method) -> Result<Self> {
    method.as_str().parse()
  }
}

impl From<Method> for reqwest::Method {
  fn from(method: Method) -> Self {
    match method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Parsed answer of the service: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
  pub status: u16,
  pub payload: Value,
}

impl Reply {
  pub fn ok(payload: Value) -> Self {
    Self { status: 200, payload }
  }

  /// A non-2xx status or a truthy `error` key.
  pub fn is_error(&self) -> bool {
    !(200..300).contains(&self.status)
      || self.payload.get("error").is_some_and(truthy)
  }

  /// The looked up target does not exist: a 404, or a 2xx carrying an
  /// `error` marker. Other failures (auth, rate limits, 5xx) are not.
  pub fn is_missing(&self) -> bool {
    self.status == 404 || ((200..300).contains(&self.status) && self.is_error())
  }

  /// `status` flag of the payload, false when absent.
  pub fn status_flag(&self) -> bool {
    self.payload.get("status").is_some_and(truthy)
  }

  pub fn into_checked(self, endpoint: &str) -> Result<Value> {
    if self.is_error() {
      return Err(Error::service(endpoint, self.payload));
    }
    Ok(self.payload)
  }

  pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Result<T> {
    let payload = self.into_checked(endpoint)?;
    json::from_value(payload).map_err(|e| Error::decode(endpoint, e))
  }

  /// Accepts a bare array or an object wrapping one under a known key.
  pub fn decode_list<T: DeserializeOwned>(
    self,
    endpoint: &str,
  ) -> Result<Vec<T>> {
    let items = match self.into_checked(endpoint)? {
      Value::Array(items) => items,
      Value::Object(mut map) => LIST_KEYS
        .iter()
        .find_map(|key| match map.remove(*key) {
          Some(Value::Array(items)) => Some(items),
          _ => None,
        })
        .ok_or_else(|| {
          Error::decode(endpoint, json::Error::custom("no list in response"))
        })?,
      other => {
        return Err(Error::decode(
          endpoint,
          json::Error::custom(format!("expected a list, got {other}")),
        ));
      }
    };

    items
      .into_iter()
      .map(|item| json::from_value(item).map_err(|e| Error::decode(endpoint, e)))
      .collect()
  }
}

/// Moves one request to the service and back.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Reply>;
}

/// reqwest-backed transport sharing one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
  config: Config,
}

impl HttpTransport {
  pub fn new(config: &Config) -> Result<Self> {
    Url::parse(&config.base_url).map_err(|e| {
      Error::InvalidArgument(format!("base url {:?}: {e}", config.base_url))
    })?;

    let mut api_key = HeaderValue::from_str(&config.api_key)
      .map_err(|e| Error::InvalidArgument(format!("api key: {e}")))?;
    api_key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, api_key);

    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }

    Ok(Self { client: builder.build()?, config: config.clone() })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Reply> {
    let url = self.config.endpoint(path);

    let response =
      self.client.request(method.into(), &url).query(query).send().await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    match json::from_str(&body) {
      Ok(payload) => Ok(Reply { status, payload }),
      Err(_) => Err(Error::UnexpectedResponse {
        endpoint: path.to_string(),
        status,
        body,
      }),
    }
  }
}
