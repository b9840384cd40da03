pub mod poll;
#[cfg(test)]
pub mod test_utils;
pub mod transport;
pub mod wallet;

pub use poll::PollOptions;
pub use transport::{HttpTransport, Method, Reply, Transport};
pub use wallet::{CreateInvoiceParams, InvoiceRef, WalletClient};
