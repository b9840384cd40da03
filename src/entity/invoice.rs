use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  config::DEFAULT_BOT,
  prelude::*,
  utils::{self, null_as_default, timestamp, timestamp_opt},
};

/// Invoice as listed by `/invoice/my_invoices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  #[serde(default, deserialize_with = "null_as_default")]
  pub creator_id: i64,
  #[serde(alias = "unique_hash", alias = "hash")]
  pub invoice_unique_hash: String,
  pub coin_id: i64,
  #[serde(alias = "amount")]
  pub coin_amount: i64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub comment: String,
  #[serde(deserialize_with = "timestamp::deserialize")]
  pub creation_time: DateTime<FixedOffset>,
  #[serde(deserialize_with = "timestamp::deserialize")]
  pub expiration_time: DateTime<FixedOffset>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub return_url: String,
}

impl Invoice {
  /// Strictly after the expiration instant; the instant itself is still
  /// payable.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now > self.expiration_time.with_timezone(&Utc)
  }

  pub fn is_expired(&self) -> bool {
    self.is_expired_at(Utc::now())
  }

  pub fn time_left(&self, now: DateTime<Utc>) -> TimeDelta {
    self.expiration_time.with_timezone(&Utc) - now
  }

  pub fn url(&self) -> String {
    self.url_for(DEFAULT_BOT)
  }

  pub fn url_for(&self, bot: &str) -> String {
    utils::start_link(bot, &self.invoice_unique_hash)
  }
}

impl fmt::Display for Invoice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Invoice({} id{}*{})",
      self.invoice_unique_hash, self.coin_id, self.coin_amount
    )
  }
}

/// Single payment made against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayHistory {
  #[serde(alias = "payer_id")]
  pub user_id: i64,
  #[serde(default, deserialize_with = "timestamp_opt::deserialize")]
  pub pay_time: Option<DateTime<FixedOffset>>,
  #[serde(default, alias = "hash", deserialize_with = "null_as_default")]
  pub pay_hash: String,
}

impl fmt::Display for PayHistory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.pay_time {
      Some(time) => write!(
        f,
        "Payment({} by {} at {})",
        self.pay_hash,
        self.user_id,
        utils::format_date(time)
      ),
      None => write!(f, "Payment({} by {})", self.pay_hash, self.user_id),
    }
  }
}

/// Invoice as returned by `/invoice/get_invoice_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInfo {
  #[serde(flatten)]
  pub invoice: Invoice,
  #[serde(default, deserialize_with = "null_as_default")]
  pub status: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub pay_history: Vec<PayHistory>,
}

impl InvoiceInfo {
  pub fn hash(&self) -> &str {
    &self.invoice.invoice_unique_hash
  }

  pub fn is_paid(&self) -> bool {
    !self.pay_history.is_empty()
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.invoice.is_expired_at(now)
  }

  pub fn is_expired(&self) -> bool {
    self.invoice.is_expired()
  }

  pub fn url(&self) -> String {
    self.invoice.url()
  }
}

impl AsRef<Invoice> for InvoiceInfo {
  fn as_ref(&self) -> &Invoice {
    &self.invoice
  }
}

impl From<InvoiceInfo> for Invoice {
  fn from(info: InvoiceInfo) -> Self {
    info.invoice
  }
}

impl fmt::Display for InvoiceInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "InvoiceInfo({} id{}*{} paid={})",
      self.hash(),
      self.invoice.coin_id,
      self.invoice.coin_amount,
      self.is_paid()
    )
  }
}
