use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};
use tracing::{debug, info};

use crate::{OrderStream, StreamError, StreamMessage};

/// Kafka-backed order stream. Offsets are committed manually, one message at
/// a time, only after the caller has durably processed the message; auto
/// commit would break the commit-after-persist ordering.
pub struct KafkaOrderStream {
    consumer: StreamConsumer,
}

impl KafkaOrderStream {
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, StreamError> {
        info!(brokers, group_id, topic, "creating Kafka consumer");

        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", group_id)
            .set("bootstrap.servers", brokers)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "10000")
            .create()?;

        consumer.subscribe(&[topic])?;

        info!("Kafka consumer created successfully");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl OrderStream for KafkaOrderStream {
    async fn fetch(&self) -> Result<StreamMessage, StreamError> {
        let message = self.consumer.recv().await?;

        debug!(
            topic = message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "received message"
        );

        // A payload-less record (tombstone) is still a message the caller
        // must see: its empty payload fails decoding downstream and is
        // committed past as poison rather than redelivered forever.
        let payload = message.payload().map(<[u8]>::to_vec).unwrap_or_default();

        Ok(StreamMessage {
            payload,
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        })
    }

    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset + 1),
        )?;
        self.consumer.commit(&tpl, CommitMode::Sync)?;

        debug!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "offset committed"
        );
        Ok(())
    }
}
