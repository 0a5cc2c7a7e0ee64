use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("failed to create Kafka producer: {0}")]
    ProducerCreation(String),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to publish message: {0}")]
    PublishFailed(String),
}

/// Kafka producer for order documents. The service itself only consumes;
/// this lives here for test traffic and local tooling.
pub struct OrderPublisher {
    producer: FutureProducer,
    topic: String,
}

impl OrderPublisher {
    pub fn new(brokers: &str, topic: String) -> Result<Self, PublisherError> {
        info!(brokers, topic, "creating Kafka producer");

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .set("retries", "3")
            .create()
            .map_err(|e| PublisherError::ProducerCreation(e.to_string()))?;

        Ok(Self { producer, topic })
    }

    /// Publish a JSON-serialized payload keyed by `key`.
    pub async fn publish<T: Serialize>(&self, key: &str, payload: &T) -> Result<(), PublisherError> {
        let body = serde_json::to_string(payload)?;
        self.send_raw(key, body.into_bytes()).await
    }

    /// Publish raw bytes. Used by tests to push deliberately malformed
    /// payloads through the pipeline.
    pub async fn send_raw(&self, key: &str, payload: Vec<u8>) -> Result<(), PublisherError> {
        let record = FutureRecord::to(&self.topic).key(key).payload(&payload);

        let (partition, offset) = self
            .producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(e, _)| PublisherError::PublishFailed(e.to_string()))?;

        debug!(key, partition, offset, "message published");
        Ok(())
    }
}
