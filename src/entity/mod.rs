pub mod cheque;
pub mod coin;
pub mod invoice;

pub use cheque::{Cheque, ChequeClaimed, ChequeInfo};
pub use coin::Coin;
pub use invoice::{Invoice, InvoiceInfo, PayHistory};
