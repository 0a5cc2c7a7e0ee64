pub mod consumer;
pub mod producer;

pub use consumer::KafkaOrderStream;
pub use producer::OrderPublisher;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// One message taken off the stream. Carries owned position metadata so the
/// offset can be committed after the message has been fully processed.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub payload: Vec<u8>,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// At-least-once message transport. `fetch` blocks until a message arrives
/// and unblocks promptly when its future is dropped (cancellation). A
/// message may be redelivered until `commit` succeeds for it, never after.
#[async_trait]
pub trait OrderStream: Send + Sync {
    async fn fetch(&self) -> Result<StreamMessage, StreamError>;

    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError>;
}
