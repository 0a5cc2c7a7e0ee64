use cache::OrderCache;
use storage::OrderStore;
use tracing::{info, warn};

/// Replay persisted orders into the cache before the pipeline and the read
/// path accept traffic. Later inserts past capacity simply evict the tail,
/// so warm-up needs no capacity handling of its own.
///
/// A failure here is a degraded start, never a fatal one: an id that fails
/// to load is skipped, and if the ids cannot be enumerated at all the
/// service starts with a cold cache.
pub async fn warm_cache<D: OrderStore + ?Sized>(store: &D, cache: &OrderCache) {
    let ids = match store.load_all_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, "could not enumerate persisted orders, starting with a cold cache");
            return;
        }
    };

    let total = ids.len();
    for order_uid in ids {
        match store.load(&order_uid).await {
            Ok(order) => cache.set(&order_uid, order),
            Err(e) => {
                warn!(order_uid = %order_uid, error = %e, "skipping order during cache warm-up");
            }
        }
    }

    info!(resident = cache.len(), persisted = total, "cache warm-up complete");
}
