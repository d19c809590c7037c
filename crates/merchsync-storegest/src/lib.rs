pub mod client;
pub mod error;
pub mod types;

pub use client::StoregestClient;
pub use error::StoregestError;
pub use types::StockRow;
