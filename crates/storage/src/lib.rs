pub mod postgres_order_store;

pub use postgres_order_store::PostgresOrderStore;

use async_trait::async_trait;
use domain::Order;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Durable order storage.
///
/// `save` must be idempotent on `order_uid`: persisting the same order twice
/// leaves one stored row and is not an error. The ingestion pipeline relies
/// on this to make redelivery-driven retries safe.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Load a full order (delivery, payment, items included).
    /// Fails with [`StoreError::NotFound`] when the id is absent.
    async fn load(&self, order_uid: &str) -> Result<Order, StoreError>;

    /// Persist an order and all its sub-records in one transaction.
    async fn save(&self, order: &Order) -> Result<(), StoreError>;

    /// All persisted identifiers. Used only for cache warm-up at startup.
    async fn load_all_ids(&self) -> Result<Vec<String>, StoreError>;
}
