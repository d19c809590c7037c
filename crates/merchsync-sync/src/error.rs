use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Shopify(#[from] merchsync_shopify::ShopifyError),

    #[error(transparent)]
    Storegest(#[from] merchsync_storegest::StoregestError),
}
