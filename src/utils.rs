use chrono::{NaiveDateTime, TimeZone};

use crate::prelude::*;

/// Offset the service uses for timestamps sent without one (Samara time).
pub const SERVICE_UTC_OFFSET_SECS: i32 = 4 * 3600;

pub fn service_offset() -> FixedOffset {
  FixedOffset::east_opt(SERVICE_UTC_OFFSET_SECS).expect("offset within a day")
}

pub fn format_date(date: &DateTime<FixedOffset>) -> String {
  date.format("%d.%m.%Y %H:%M").to_string()
}

pub fn start_link(bot: &str, payload: &str) -> String {
  format!("https://t.me/{bot}?start={payload}")
}

/// Source of "now" for expiration checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Parses an ISO-8601 timestamp. Naive values are placed in the service
/// offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
  let raw = raw.trim();

  if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
    return Some(date);
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
    if let Ok(date) = DateTime::parse_from_str(raw, fmt) {
      return Some(date);
    }
  }

  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .and_then(|naive| service_offset().from_local_datetime(&naive).single())
}

/// Python-style truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
  }
}

/// Treats an explicit `null` like a missing field.
pub fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + serde::Deserialize<'de>,
{
  <Option<T> as serde::Deserialize>::deserialize(de)
    .map(Option::unwrap_or_default)
}

pub mod timestamp {
  use serde::{Deserialize, Deserializer, de::Error as _};

  use super::*;

  pub fn deserialize<'de, D>(de: D) -> Result<DateTime<FixedOffset>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(de)?;
    parse_timestamp(&raw)
      .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
  }
}

pub mod timestamp_opt {
  use serde::{Deserialize, Deserializer, de::Error as _};

  use super::*;

  pub fn deserialize<'de, D>(
    de: D,
  ) -> Result<Option<DateTime<FixedOffset>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    match Option::<String>::deserialize(de)? {
      Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
      _ => Ok(None),
    }
  }
}
