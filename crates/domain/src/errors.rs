use thiserror::Error;

/// Structural validation failures for incoming orders. The variant names the
/// field that failed so consumers can log a precise reason.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("order_uid is empty")]
    MissingOrderUid,

    #[error("payment.transaction is empty")]
    MissingTransaction,

    #[error("delivery.name is empty")]
    MissingDeliveryName,

    #[error("order has no items")]
    NoItems,

    #[error("item chrt_id must be positive, got {0}")]
    InvalidChrtId(i64),
}
