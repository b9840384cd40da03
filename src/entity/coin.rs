use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::null_as_default;

/// Real coin.
pub const WAV: i64 = 1;
/// Test coin, same rules but worthless.
pub const TWAV: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
  #[serde(alias = "id")]
  pub coin_id: i64,
  #[serde(default, alias = "coin_name", deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, alias = "ticker", deserialize_with = "null_as_default")]
  pub symbol: String,
}

impl fmt::Display for Coin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Coin({} {} {})", self.coin_id, self.symbol, self.name)
  }
}
