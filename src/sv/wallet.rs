//! Client for the stupidwallet HTTP API.
//!
//! Every call goes through [`WalletClient::request`], which sends the
//! `api-key` header and then pauses for [`Config::request_delay`] to stay
//! under the service's rate limit. Responses are classified the same way
//! everywhere: a truthy `error` key or a non-2xx status is an
//! [`Error::Service`], except for plain lookups, which report a missing
//! target as `None`.

use std::{borrow::Cow, ops::ControlFlow};

use crate::{
  config::Config,
  entity::{Cheque, ChequeClaimed, ChequeInfo, Coin, Invoice, InvoiceInfo},
  prelude::*,
  sv::{
    poll::{self, PollOptions},
    transport::{HttpTransport, Method, Reply, Transport},
  },
  utils::{self, Clock, SystemClock},
};

pub const DEFAULT_CHEQUE_COMMENT: &str = "*cheque comment*";
pub const DEFAULT_EXPIRATION_MINUTES: u32 = 60;

pub mod path {
  pub const GET_BALANCE: &str = "/user/get_balance";
  pub const EXISTING_COINS: &str = "/base/existing_coins";
  pub const CREATE_INVOICE: &str = "/invoice/create_invoice";
  pub const MY_INVOICES: &str = "/invoice/my_invoices";
  pub const GET_INVOICE_DATA: &str = "/invoice/get_invoice_data";
  pub const PAY_INVOICE: &str = "/invoice/pay_invoice";
  pub const DELETE_INVOICE: &str = "/invoice/delete_invoice";
  pub const CREATE_CHEQUE: &str = "/user/create_cheque";
  pub const INFO_CHEQUE: &str = "/user/info_cheque";
  pub const CLAIM_CHEQUE: &str = "/user/claim_cheque";
  pub const MY_CHEQUES: &str = "/user/my_cheques";
}

/// Parameters for creating an invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInvoiceParams {
  pub coin_id: i64,
  pub coin_amount: i64,
  /// Minutes until the invoice expires
  pub expiration_minutes: u32,
  pub comment: String,
  /// Where the "return" button of the payment page leads
  pub return_url: String,
}

impl CreateInvoiceParams {
  pub fn new(coin_id: i64, coin_amount: i64) -> Self {
    Self {
      coin_id,
      coin_amount,
      expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
      comment: String::new(),
      return_url: String::new(),
    }
  }

  pub fn expiration_minutes(mut self, minutes: u32) -> Self {
    self.expiration_minutes = minutes;
    self
  }

  pub fn comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = comment.into();
    self
  }

  pub fn return_url(mut self, url: impl Into<String>) -> Self {
    self.return_url = url.into();
    self
  }

  fn query(&self) -> Vec<(&'static str, String)> {
    vec![
      ("coin_id", self.coin_id.to_string()),
      ("coin_amount", self.coin_amount.to_string()),
      ("expiration_time", self.expiration_minutes.to_string()),
      ("comment", self.comment.clone()),
      ("return_url", self.return_url.clone()),
    ]
  }
}

/// An invoice given either by hash or as an already fetched value.
#[derive(Debug, Clone, Copy)]
pub enum InvoiceRef<'a> {
  Hash(&'a str),
  Invoice(&'a Invoice),
}

impl<'a> From<&'a str> for InvoiceRef<'a> {
  fn from(hash: &'a str) -> Self {
    Self::Hash(hash)
  }
}

impl<'a> From<&'a String> for InvoiceRef<'a> {
  fn from(hash: &'a String) -> Self {
    Self::Hash(hash)
  }
}

impl<'a> From<&'a Invoice> for InvoiceRef<'a> {
  fn from(invoice: &'a Invoice) -> Self {
    Self::Invoice(invoice)
  }
}

impl<'a> From<&'a InvoiceInfo> for InvoiceRef<'a> {
  fn from(info: &'a InvoiceInfo) -> Self {
    Self::Invoice(&info.invoice)
  }
}

#[derive(Clone)]
pub struct WalletClient {
  config: Arc<Config>,
  transport: Arc<dyn Transport>,
  clock: Arc<dyn Clock>,
}

impl WalletClient {
  /// Client for the default host.
  pub fn new(api_key: impl Into<String>) -> Result<Self> {
    Self::with_config(Config::new(api_key))
  }

  pub fn from_env() -> Result<Self> {
    Self::with_config(Config::from_env()?)
  }

  pub fn with_config(config: Config) -> Result<Self> {
    let transport = HttpTransport::new(&config)?;
    Ok(Self::with_transport(config, Arc::new(transport)))
  }

  pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
    Self { config: Arc::new(config), transport, clock: Arc::new(SystemClock) }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn is_expired(&self, invoice: &Invoice) -> bool {
    invoice.is_expired_at(self.clock.now())
  }

  pub fn invoice_url(&self, invoice: &Invoice) -> String {
    invoice.url_for(&self.config.bot_username)
  }

  pub fn cheque_url(&self, cheque: &Cheque) -> String {
    cheque.url_for(&self.config.bot_username)
  }

  /// Sends one request and waits out the post-call delay.
  pub async fn request(
    &self,
    path: &str,
    method: Method,
    query: &[(&str, String)],
  ) -> Result<Reply> {
    debug!(%method, path, "request");

    let sent = self.transport.send(method, path, query).await;

    // the service answered, even if the body is garbage
    let answered = !matches!(sent, Err(Error::Transport(_)));
    if answered && !self.config.request_delay.is_zero() {
      tokio::time::sleep(self.config.request_delay).await;
    }

    let reply = sent?;
    trace!(path, status = reply.status, payload = %reply.payload, "reply");
    Ok(reply)
  }

  /// Raw balance payload for a coin.
  pub async fn get_balance(&self, coin_id: i64) -> Result<Value> {
    let query = [("coin_id", coin_id.to_string())];
    self
      .request(path::GET_BALANCE, Method::Get, &query)
      .await?
      .into_checked(path::GET_BALANCE)
  }

  pub async fn existing_coins(&self) -> Result<Vec<Coin>> {
    self
      .request(path::EXISTING_COINS, Method::Get, &[])
      .await?
      .decode_list(path::EXISTING_COINS)
  }

  // Invoices

  /// Creates an invoice and fetches it back.
  ///
  /// When the service hands out no hash (the invoice limit is reached),
  /// expired invoices are swept and creation is retried once.
  pub async fn create_invoice(
    &self,
    params: &CreateInvoiceParams,
  ) -> Result<InvoiceInfo> {
    let hash = match self.post_invoice(params).await? {
      (Some(hash), _) => hash,
      (None, payload) => {
        warn!(%payload, "no invoice hash returned, sweeping expired invoices");
        let swept = self.check_expired_invoices().await?;
        debug!(swept, "retrying invoice creation");

        match self.post_invoice(params).await? {
          (Some(hash), _) => hash,
          (None, payload) => {
            return Err(Error::service(path::CREATE_INVOICE, payload));
          }
        }
      }
    };

    info!(
      hash = %hash,
      coin_id = params.coin_id,
      amount = params.coin_amount,
      "invoice created"
    );

    let info = self.check_invoice(&hash).await?;
    info.ok_or(Error::NotFound(hash))
  }

  async fn post_invoice(
    &self,
    params: &CreateInvoiceParams,
  ) -> Result<(Option<String>, Value)> {
    let payload = self
      .request(path::CREATE_INVOICE, Method::Post, &params.query())
      .await?
      .into_checked(path::CREATE_INVOICE)?;

    let hash = payload
      .get("invoice_unique_hash")
      .and_then(Value::as_str)
      .filter(|hash| !hash.is_empty())
      .map(str::to_string);

    Ok((hash, payload))
  }

  pub async fn get_all_invoices(&self) -> Result<Vec<Invoice>> {
    self
      .request(path::MY_INVOICES, Method::Get, &[])
      .await?
      .decode_list(path::MY_INVOICES)
  }

  pub async fn my_invoices(&self) -> Result<Vec<Invoice>> {
    self.get_all_invoices().await
  }

  /// `None` when the hash does not resolve, any other failure reply is an
  /// [`Error::Service`].
  pub async fn check_invoice(&self, hash: &str) -> Result<Option<InvoiceInfo>> {
    let reply = self
      .request(
        path::GET_INVOICE_DATA,
        Method::Get,
        &[("invoice_unique_hash", hash.to_string())],
      )
      .await?;

    if reply.is_missing() {
      debug!(hash, payload = %reply.payload, "invoice not found");
      return Ok(None);
    }

    reply.decode(path::GET_INVOICE_DATA).map(Some)
  }

  pub async fn get_invoice_data(
    &self,
    hash: &str,
  ) -> Result<Option<InvoiceInfo>> {
    self.check_invoice(hash).await
  }

  /// True if the service reports the invoice as deleted, false if it is
  /// already gone.
  pub async fn delete_invoice(&self, hash: &str) -> Result<bool> {
    let reply = self
      .request(
        path::DELETE_INVOICE,
        Method::Delete,
        &[("invoice_unique_hash", hash.to_string())],
      )
      .await?;

    if reply.is_missing() {
      warn!(hash, payload = %reply.payload, "invoice was not deleted");
      return Ok(false);
    }

    if reply.is_error() {
      return Err(Error::service(path::DELETE_INVOICE, reply.payload));
    }

    let deleted = reply.status_flag();
    if deleted {
      info!(hash, "invoice deleted");
    }
    Ok(deleted)
  }

  pub async fn pay_invoice(&self, hash: &str) -> Result<bool> {
    let reply = self
      .request(
        path::PAY_INVOICE,
        Method::Post,
        &[("invoice_unique_hash", hash.to_string())],
      )
      .await?;

    if reply.is_error() {
      return Err(Error::service(path::PAY_INVOICE, reply.payload));
    }

    let paid = reply.status_flag();
    info!(hash, paid, "invoice payment sent");
    Ok(paid)
  }

  /// Deletes every invoice of the account. Best effort, returns how many
  /// were actually deleted.
  pub async fn clear_invoices(&self) -> Result<usize> {
    let mut deleted = 0;
    for invoice in self.get_all_invoices().await? {
      if self.delete_invoice(&invoice.invoice_unique_hash).await? {
        deleted += 1;
      }
    }
    Ok(deleted)
  }

  /// Deletes the invoice if it is past its expiration time.
  ///
  /// Returns `Some(true)` if it was expired, `Some(false)` if it is still
  /// live and `None` if a hash did not resolve.
  pub async fn check_expired_invoice<'a>(
    &self,
    target: impl Into<InvoiceRef<'a>>,
  ) -> Result<Option<bool>> {
    let invoice: Cow<'a, Invoice> = match target.into() {
      InvoiceRef::Invoice(invoice) => Cow::Borrowed(invoice),
      InvoiceRef::Hash(hash) => match self.check_invoice(hash).await? {
        Some(info) => Cow::Owned(info.invoice),
        None => return Ok(None),
      },
    };

    if !self.is_expired(&invoice) {
      return Ok(Some(false));
    }

    let hash = &invoice.invoice_unique_hash;
    if !self.delete_invoice(hash).await? {
      warn!(hash = %hash, "expired invoice is still listed");
    }
    Ok(Some(true))
  }

  pub async fn is_invoice_expired<'a>(
    &self,
    target: impl Into<InvoiceRef<'a>>,
  ) -> Result<Option<bool>> {
    self.check_expired_invoice(target).await
  }

  /// Sweeps all expired invoices, returns how many were found expired.
  pub async fn check_expired_invoices(&self) -> Result<usize> {
    let mut expired = 0;
    for invoice in self.get_all_invoices().await? {
      if self.check_expired_invoice(&invoice).await? == Some(true) {
        expired += 1;
      }
    }
    Ok(expired)
  }

  /// Waits until the invoice is paid or expired and tells which.
  pub async fn wait_pay_invoice(
    &self,
    hash: &str,
    options: &PollOptions,
  ) -> Result<bool> {
    poll::until(options, |attempt| self.probe_payment(hash, attempt)).await
  }

  async fn probe_payment(
    &self,
    hash: &str,
    attempt: u32,
  ) -> Result<ControlFlow<bool>> {
    let Some(info) = self.check_invoice(hash).await? else {
      if attempt == 1 {
        return Err(Error::NotFound(hash.to_string()));
      }
      debug!(hash, "invoice disappeared while waiting for payment");
      return Ok(ControlFlow::Break(false));
    };

    if info.is_paid() || self.is_expired(&info.invoice) {
      Ok(ControlFlow::Break(info.is_paid()))
    } else {
      Ok(ControlFlow::Continue(()))
    }
  }

  // Cheques

  /// Creates a cheque and fetches it back. `None` uses
  /// [`DEFAULT_CHEQUE_COMMENT`].
  pub async fn create_cheque(
    &self,
    coin_id: i64,
    coin_amount: i64,
    comment: Option<&str>,
  ) -> Result<ChequeInfo> {
    let query = [
      ("coin_id", coin_id.to_string()),
      ("coin_amount", coin_amount.to_string()),
      ("comment", comment.unwrap_or(DEFAULT_CHEQUE_COMMENT).to_string()),
    ];
    let payload = self
      .request(path::CREATE_CHEQUE, Method::Post, &query)
      .await?
      .into_checked(path::CREATE_CHEQUE)?;

    let Some(cheque_id) = payload
      .get("cheque_id")
      .and_then(Value::as_str)
      .filter(|id| !id.is_empty())
      .map(str::to_string)
    else {
      return Err(Error::service(path::CREATE_CHEQUE, payload));
    };

    info!(
      cheque_id = %cheque_id,
      coin_id,
      amount = coin_amount,
      "cheque created"
    );

    let info = self.check_cheque(&cheque_id).await?;
    info.ok_or(Error::NotFound(cheque_id))
  }

  /// `None` when the cheque id does not resolve, any other failure reply is
  /// an [`Error::Service`].
  pub async fn check_cheque(
    &self,
    cheque_id: &str,
  ) -> Result<Option<ChequeInfo>> {
    let reply = self
      .request(
        path::INFO_CHEQUE,
        Method::Get,
        &[("cheque_id", cheque_id.to_string())],
      )
      .await?;

    if reply.is_missing() {
      debug!(cheque_id, payload = %reply.payload, "cheque not found");
      return Ok(None);
    }

    let info: ChequeInfo = reply.decode(path::INFO_CHEQUE)?;
    Ok(Some(info.with_id(cheque_id)))
  }

  pub async fn info_cheque(
    &self,
    cheque_id: &str,
  ) -> Result<Option<ChequeInfo>> {
    self.check_cheque(cheque_id).await
  }

  /// Redeems a cheque. A rejected claim (wrong password, already claimed)
  /// is an [`Error::Service`].
  pub async fn claim_cheque(
    &self,
    cheque_id: &str,
    password: &str,
  ) -> Result<ChequeClaimed> {
    let payload = self
      .request(
        path::CLAIM_CHEQUE,
        Method::Post,
        &[
          ("cheque_id", cheque_id.to_string()),
          ("password", password.to_string()),
        ],
      )
      .await?
      .into_checked(path::CLAIM_CHEQUE)?;

    if payload.get("status").is_some_and(|status| !utils::truthy(status)) {
      return Err(Error::service(path::CLAIM_CHEQUE, payload));
    }

    let claimed: ChequeClaimed = json::from_value(payload)
      .map_err(|e| Error::decode(path::CLAIM_CHEQUE, e))?;
    info!(cheque_id, %claimed, "cheque claimed");
    Ok(claimed)
  }

  pub async fn my_cheques(&self) -> Result<Vec<Cheque>> {
    self
      .request(path::MY_CHEQUES, Method::Get, &[])
      .await?
      .decode_list(path::MY_CHEQUES)
  }

  /// Waits until somebody claims the cheque.
  pub async fn wait_claim_cheque(
    &self,
    cheque_id: &str,
    options: &PollOptions,
  ) -> Result<ChequeInfo> {
    poll::until(options, |_| self.probe_claim(cheque_id)).await
  }

  async fn probe_claim(
    &self,
    cheque_id: &str,
  ) -> Result<ControlFlow<ChequeInfo>> {
    let info = self
      .check_cheque(cheque_id)
      .await?
      .ok_or_else(|| Error::NotFound(cheque_id.to_string()))?;

    if info.is_activated {
      Ok(ControlFlow::Break(info))
    } else {
      Ok(ControlFlow::Continue(()))
    }
  }
}
