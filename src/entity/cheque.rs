use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  config::DEFAULT_BOT,
  utils::{self, null_as_default},
};

/// Cheque as listed by `/user/my_cheques`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cheque {
  #[serde(default, deserialize_with = "null_as_default")]
  pub cheque_id: String,
  pub coin_id: i64,
  #[serde(alias = "amount")]
  pub coin_amount: i64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub comment: String,
  #[serde(default)]
  pub password: Option<String>,
}

impl Cheque {
  pub fn is_protected(&self) -> bool {
    self.password.as_deref().is_some_and(|p| !p.is_empty())
  }

  pub fn url(&self) -> String {
    self.url_for(DEFAULT_BOT)
  }

  pub fn url_for(&self, bot: &str) -> String {
    utils::start_link(bot, &self.cheque_id)
  }
}

impl fmt::Display for Cheque {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<Cheque {} id{}*{}>",
      self.cheque_id, self.coin_id, self.coin_amount
    )
  }
}

/// Cheque as returned by `/user/info_cheque`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeInfo {
  #[serde(flatten)]
  pub cheque: Cheque,
  #[serde(default, deserialize_with = "null_as_default")]
  pub status: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub is_activated: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub has_password: bool,
}

impl ChequeInfo {
  pub fn cheque_id(&self) -> &str {
    &self.cheque.cheque_id
  }

  /// Fills in the id when the payload did not carry one. An id that came
  /// from the service is never replaced.
  pub fn attach_id(&mut self, cheque_id: &str) {
    if self.cheque.cheque_id.is_empty() {
      self.cheque.cheque_id = cheque_id.to_string();
    }
  }

  pub fn with_id(mut self, cheque_id: &str) -> Self {
    self.attach_id(cheque_id);
    self
  }

  pub fn url(&self) -> String {
    self.cheque.url()
  }
}

impl AsRef<Cheque> for ChequeInfo {
  fn as_ref(&self) -> &Cheque {
    &self.cheque
  }
}

impl fmt::Display for ChequeInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<Cheque {} is_activated={} id{}*{}>",
      self.cheque.cheque_id,
      self.is_activated,
      self.cheque.coin_id,
      self.cheque.coin_amount
    )
  }
}

/// What a successful claim actually transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeClaimed {
  #[serde(default, deserialize_with = "null_as_default")]
  pub status: bool,
  pub coin_id: i64,
  #[serde(alias = "amount")]
  pub coin_amount: i64,
}

impl fmt::Display for ChequeClaimed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Claimed(id{}*{})", self.coin_id, self.coin_amount)
  }
}
