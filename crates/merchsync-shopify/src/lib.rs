pub mod client;
pub mod error;
pub mod rate_limit;
pub mod types;

pub use client::{ClientOptions, ShopifyClient};
pub use error::ShopifyError;
pub use rate_limit::Pacer;
pub use types::{ProductHit, ProductPatch, RemoteProduct, RemoteVariant, VariantHit, VariantPatch};
