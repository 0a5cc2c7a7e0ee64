use std::sync::Arc;

use cache::OrderCache;
use common::metrics;
use domain::Order;
use messaging::{OrderStream, StreamMessage};
use storage::OrderStore;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// The ingestion loop: fetch → decode → validate → persist → commit →
/// cache-populate, one message at a time.
///
/// The offset for a message is committed only after its order has been
/// durably persisted; a reader can therefore never observe a cache hit for
/// an identifier that is not in the store. Malformed or invalid messages can
/// never succeed and are committed past instead of being redelivered
/// forever. Persistence failures leave the offset uncommitted so the
/// transport redelivers the message once the store recovers; the store's
/// idempotent save makes those retries safe.
pub struct IngestPipeline<S, D: ?Sized> {
    stream: Arc<S>,
    store: Arc<D>,
    cache: Arc<OrderCache>,
}

impl<S, D> IngestPipeline<S, D>
where
    S: OrderStream,
    D: OrderStore + ?Sized,
{
    pub fn new(stream: Arc<S>, store: Arc<D>, cache: Arc<OrderCache>) -> Self {
        Self {
            stream,
            store,
            cache,
        }
    }

    /// Run until `shutdown` fires. An in-flight fetch is abandoned promptly
    /// when the signal arrives; no message is processed after that.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("ingestion pipeline started");

        loop {
            let message = tokio::select! {
                _ = shutdown.changed() => {
                    info!("ingestion pipeline stopped");
                    return;
                }
                fetched = self.stream.fetch() => match fetched {
                    Ok(message) => message,
                    Err(e) => {
                        // transient transport error, keep consuming
                        metrics::STREAM_ERRORS_TOTAL.inc();
                        error!(error = %e, "failed to fetch message");
                        continue;
                    }
                }
            };

            metrics::STREAM_MESSAGES_TOTAL.inc();
            let timer = metrics::MESSAGE_PROCESS_DURATION.start_timer();
            self.process(message).await;
            timer.observe_duration();
        }
    }

    async fn process(&self, message: StreamMessage) {
        let order: Order = match serde_json::from_slice(&message.payload) {
            Ok(order) => order,
            Err(e) => {
                metrics::STREAM_ERRORS_TOTAL.inc();
                warn!(
                    offset = message.offset,
                    error = %e,
                    "undecodable message, committing past it"
                );
                self.commit_past(&message).await;
                return;
            }
        };

        if let Err(e) = order.validate() {
            metrics::STREAM_ERRORS_TOTAL.inc();
            warn!(
                order_uid = %order.order_uid,
                offset = message.offset,
                reason = %e,
                "invalid order, committing past it"
            );
            self.commit_past(&message).await;
            return;
        }

        // Leave the offset uncommitted on failure: the message will be
        // redelivered and retried once the store recovers.
        if let Err(e) = self.store.save(&order).await {
            metrics::STREAM_ERRORS_TOTAL.inc();
            error!(
                order_uid = %order.order_uid,
                offset = message.offset,
                error = %e,
                "persist failed, offset left uncommitted for redelivery"
            );
            return;
        }

        // A failed commit risks redelivery, which the idempotent save absorbs.
        if let Err(e) = self.stream.commit(&message).await {
            metrics::STREAM_ERRORS_TOTAL.inc();
            error!(
                order_uid = %order.order_uid,
                offset = message.offset,
                error = %e,
                "offset commit failed"
            );
        }

        let order_uid = order.order_uid.clone();
        self.cache.set(&order_uid, order);
        info!(order_uid = %order_uid, offset = message.offset, "order ingested");
    }

    /// Commit past a poison message so it is not redelivered forever.
    async fn commit_past(&self, message: &StreamMessage) {
        if let Err(e) = self.stream.commit(message).await {
            metrics::STREAM_ERRORS_TOTAL.inc();
            error!(offset = message.offset, error = %e, "commit failed");
        }
    }
}
