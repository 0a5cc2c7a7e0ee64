use anyhow::Result;
use cache::OrderCache;
use common::telemetry::init_telemetry;
use common::AppConfig;
use messaging::KafkaOrderStream;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use sqlx::PgPool;
use std::sync::Arc;
use storage::{OrderStore, PostgresOrderStore};
use tokio::sync::watch;
use tracing::{error, info};

mod handlers;
mod pipeline;
mod routes;
mod state;
#[cfg(test)]
mod testutil;
mod warmup;

use pipeline::IngestPipeline;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_telemetry("order_service=info,storage=info,messaging=info");

    info!("starting order service");

    let config = AppConfig::from_env()?;
    info!(
        brokers = %config.kafka.brokers,
        topic = %config.kafka.topic,
        group_id = %config.kafka.group_id,
        http_addr = %config.http_addr,
        cache_capacity = config.cache_capacity,
        "configuration loaded"
    );

    info!("connecting to database");
    let pool = PgPool::connect(&config.database_url).await?;
    PostgresOrderStore::run_migrations(&pool).await?;
    let store: Arc<PostgresOrderStore> = Arc::new(PostgresOrderStore::new(
        pool.clone(),
        config.store_timeouts,
    ));

    let order_cache = Arc::new(OrderCache::new(config.cache_capacity));
    warmup::warm_cache(store.as_ref(), &order_cache).await;

    let stream = Arc::new(KafkaOrderStream::new(
        &config.kafka.brokers,
        &config.kafka.group_id,
        &config.kafka.topic,
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ingest = IngestPipeline::new(stream.clone(), store.clone(), order_cache.clone());
    let pipeline_task = tokio::spawn(ingest.run(shutdown_rx));

    let app_state = AppState {
        cache: order_cache,
        store: store.clone() as Arc<dyn OrderStore>,
        http_timeout: config.http_timeout,
    };
    let app = routes::create_router(app_state);

    let signals = Signals::new([SIGINT, SIGTERM])?;
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(addr = %config.http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(signals))
        .await?;

    // Stop the pipeline and wait for it to observe cancellation before the
    // stream and store handles are dropped.
    info!("shutting down services");
    let _ = shutdown_tx.send(true);
    if let Err(e) = pipeline_task.await {
        error!(error = %e, "pipeline task failed");
    }
    drop(stream);
    pool.close().await;

    info!("order service stopped");
    Ok(())
}

async fn shutdown_signal(mut signals: Signals) {
    use futures_util::stream::StreamExt;
    if let Some(signal) = signals.next().await {
        info!(signal, "shutdown signal received");
    }
}
