//! In-process doubles for the stream and store collaborators, used by the
//! pipeline and warm-up unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{Delivery, Item, Order, Payment};
use messaging::{OrderStream, StreamError, StreamMessage};
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use storage::{OrderStore, StoreError};
use tokio::sync::watch;

pub fn valid_order(uid: &str) -> Order {
    Order {
        order_uid: uid.to_string(),
        track_number: format!("TRK-{uid}"),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Alice".to_string(),
            phone: "+123".to_string(),
            zip: "11111".to_string(),
            city: "City".to_string(),
            address: "Street 1".to_string(),
            region: "Region".to_string(),
            email: "a@a.com".to_string(),
        },
        payment: Payment {
            transaction: format!("txn-{uid}"),
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 100,
            payment_dt: 1637907727,
            bank: "alpha".to_string(),
            delivery_cost: 50,
            goods_total: 50,
            custom_fee: 0,
        },
        items: vec![Item {
            chrt_id: 1,
            track_number: format!("TRK-{uid}"),
            price: 50,
            rid: format!("rid-{uid}"),
            name: "Item1".to_string(),
            sale: 0,
            size: "0".to_string(),
            total_price: 50,
            nm_id: 10,
            brand: "Brand".to_string(),
            status: 202,
        }],
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: "cust1".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "1".to_string(),
        sm_id: 1,
        date_created: Utc.timestamp_opt(1637907727, 0).unwrap(),
        oof_shard: "1".to_string(),
    }
}

/// Replays a fixed script of messages, then optionally signals shutdown and
/// blocks forever, so a pipeline under test drains the script and stops.
pub struct ScriptedStream {
    messages: Mutex<VecDeque<StreamMessage>>,
    committed: Mutex<Vec<i64>>,
    fail_commits: bool,
    drained: Mutex<Option<watch::Sender<bool>>>,
}

impl ScriptedStream {
    pub fn new(messages: Vec<StreamMessage>) -> Self {
        Self {
            messages: Mutex::new(messages.into()),
            committed: Mutex::new(Vec::new()),
            fail_commits: false,
            drained: Mutex::new(None),
        }
    }

    pub fn with_failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    /// Fire `tx` once the script runs out, stopping the pipeline under test.
    pub fn shutdown_when_drained(&self, tx: watch::Sender<bool>) {
        *self.drained.lock().unwrap() = Some(tx);
    }

    pub fn committed_offsets(&self) -> Vec<i64> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderStream for ScriptedStream {
    async fn fetch(&self) -> Result<StreamMessage, StreamError> {
        if let Some(message) = self.messages.lock().unwrap().pop_front() {
            return Ok(message);
        }
        if let Some(tx) = self.drained.lock().unwrap().take() {
            let _ = tx.send(true);
        }
        std::future::pending().await
    }

    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError> {
        if self.fail_commits {
            return Err(StreamError::Kafka(KafkaError::ConsumerCommit(
                RDKafkaErrorCode::OperationTimedOut,
            )));
        }
        self.committed.lock().unwrap().push(message.offset);
        Ok(())
    }
}

/// Map-backed store with idempotent saves and a configurable number of
/// initial save failures, for exercising the redelivery path.
pub struct InMemoryStore {
    rows: Mutex<HashMap<String, Order>>,
    failing_loads: Mutex<Vec<String>>,
    saves_to_fail: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            failing_loads: Mutex::new(Vec::new()),
            saves_to_fail: AtomicUsize::new(0),
        }
    }

    /// A store whose first `n` saves fail with a timeout.
    pub fn failing_saves(n: usize) -> Self {
        let store = Self::new();
        store.saves_to_fail.store(n, Ordering::SeqCst);
        store
    }

    /// Pre-populate a persisted order.
    pub fn insert(&self, order: Order) {
        self.rows
            .lock()
            .unwrap()
            .insert(order.order_uid.clone(), order);
    }

    /// Make `load` fail for this id even though it is enumerated.
    pub fn poison_load(&self, order_uid: &str) {
        self.failing_loads
            .lock()
            .unwrap()
            .push(order_uid.to_string());
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn load(&self, order_uid: &str) -> Result<Order, StoreError> {
        if self.failing_loads.lock().unwrap().iter().any(|id| id == order_uid) {
            return Err(StoreError::Timeout(std::time::Duration::from_secs(0)));
        }
        self.rows
            .lock()
            .unwrap()
            .get(order_uid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(order_uid.to_string()))
    }

    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let remaining = self.saves_to_fail.load(Ordering::SeqCst);
        if remaining > 0 {
            self.saves_to_fail.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Timeout(std::time::Duration::from_secs(0)));
        }
        // duplicate insert of the same identifier is a no-op
        self.rows
            .lock()
            .unwrap()
            .entry(order.order_uid.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn load_all_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = {
            let rows = self.rows.lock().unwrap();
            rows.keys().cloned().collect()
        };
        let poisoned = self.failing_loads.lock().unwrap();
        ids.extend(poisoned.iter().cloned());
        ids.sort();
        Ok(ids)
    }
}
