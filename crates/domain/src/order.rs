use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Delivery address block of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment block of an order. `payment_dt` is unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single order line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

/// The order record flowing through ingestion and served by lookup.
/// Immutable once constructed; field names match the wire JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

impl Order {
    /// Structural validity check. Short-circuits on the first failing field;
    /// an order that fails here must never reach the store or the cache.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.order_uid.is_empty() {
            return Err(DomainError::MissingOrderUid);
        }
        if self.payment.transaction.is_empty() {
            return Err(DomainError::MissingTransaction);
        }
        if self.delivery.name.is_empty() {
            return Err(DomainError::MissingDeliveryName);
        }
        if self.items.is_empty() {
            return Err(DomainError::NoItems);
        }
        for item in &self.items {
            if item.chrt_id <= 0 {
                return Err(DomainError::InvalidChrtId(item.chrt_id));
            }
        }
        Ok(())
    }
}
