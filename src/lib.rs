//! Async client for the stupidwallet payment service.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use stupidwallet::{CreateInvoiceParams, PollOptions, WalletClient, coin};
//!
//! # async fn run() -> stupidwallet::Result<()> {
//! let wallet = WalletClient::new("api-key")?;
//!
//! let params = CreateInvoiceParams::new(coin::TWAV, 100).comment("coffee");
//! let invoice = wallet.create_invoice(&params).await?;
//! println!("pay here: {}", wallet.invoice_url(&invoice.invoice));
//!
//! let options = PollOptions::default().timeout(Duration::from_secs(600));
//! if wallet.wait_pay_invoice(invoice.hash(), &options).await? {
//!   println!("paid");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
mod prelude;
pub mod sv;
pub mod utils;

pub use config::Config;
pub use entity::{
  Cheque, ChequeClaimed, ChequeInfo, Coin, Invoice, InvoiceInfo, PayHistory,
  coin,
};
pub use error::{Error, Result};
pub use sv::{
  CreateInvoiceParams, HttpTransport, InvoiceRef, Method, PollOptions, Reply,
  Transport, WalletClient, wallet::DEFAULT_CHEQUE_COMMENT,
};
pub use utils::{Clock, SystemClock};
