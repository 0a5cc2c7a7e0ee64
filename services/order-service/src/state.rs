use std::sync::Arc;
use std::time::Duration;

use cache::OrderCache;
use storage::OrderStore;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<OrderCache>,
    pub store: Arc<dyn OrderStore>,
    /// Budget for a store lookup made on behalf of an HTTP caller, distinct
    /// from the pipeline's own store timeouts.
    pub http_timeout: Duration,
}
