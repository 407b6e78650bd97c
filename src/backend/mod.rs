// Backend abstraction over the identity directory and the relational data API

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{BalanceRecord, Identity, NewCatalogItem, NewIdentity, NewStore, StoreRef};

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure: connection refused, timeout, TLS
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Every call is a single round trip; no retries happen at this layer
#[async_trait]
pub trait Backend: Send + Sync {
    /// All identities in the directory, across every page
    async fn list_identities(&self) -> BackendResult<Vec<Identity>>;

    async fn create_identity(&self, identity: &NewIdentity) -> BackendResult<Identity>;

    /// First store owned by `owner_id`, if any
    async fn find_store_by_owner(&self, owner_id: &str) -> BackendResult<Option<StoreRef>>;

    async fn create_store(&self, store: &NewStore) -> BackendResult<StoreRef>;

    /// Insert the whole batch in one request
    async fn create_catalog_items(&self, items: &[NewCatalogItem]) -> BackendResult<()>;

    async fn find_balance(&self, user_id: &str) -> BackendResult<Option<BalanceRecord>>;

    async fn update_balance(&self, balance_id: &str, balance: i64) -> BackendResult<()>;
}
