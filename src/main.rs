use processor_gateway::config::{AppConfig, StorageBackend};
use processor_gateway::http::routes::build_router;
use processor_gateway::processors::http::HttpProcessorClient;
use processor_gateway::processors::ProcessorClient;
use processor_gateway::service::admission_queue::AdmissionQueue;
use processor_gateway::service::dispatch_worker::DispatchWorker;
use processor_gateway::service::health_monitor::HealthMonitor;
use processor_gateway::service::payment_service::PaymentService;
use processor_gateway::service::provider_selector::ProviderSelector;
use processor_gateway::store::store_memory::InMemoryStore;
use processor_gateway::store::store_redis::RedisStore;
use processor_gateway::store::{PaymentStore, ProviderStateStore};
use processor_gateway::AppState;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;
    cfg.log_summary();

    let (payment_store, provider_store) = match cfg.storage_backend {
        StorageBackend::Redis => {
            let store = Arc::new(RedisStore::connect(&cfg.redis_url).await?);
            store.ping().await?;
            (
                store.clone() as Arc<dyn PaymentStore>,
                store as Arc<dyn ProviderStateStore>,
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, state is not shared across instances");
            let store = Arc::new(InMemoryStore::new());
            (
                store.clone() as Arc<dyn PaymentStore>,
                store as Arc<dyn ProviderStateStore>,
            )
        }
    };

    let client: Arc<dyn ProcessorClient> = Arc::new(HttpProcessorClient::from_config(&cfg)?);
    let queue = AdmissionQueue::new(cfg.queue_capacity);
    let selector = ProviderSelector::new(provider_store.clone());
    let cancel = CancellationToken::new();

    let monitor = HealthMonitor {
        selector: selector.clone(),
        store: provider_store,
        client: client.clone(),
        interval: cfg.health_check_interval,
        lock_ttl: cfg.health_lock_ttl,
    };
    let monitor_handle = tokio::spawn(monitor.run(cancel.clone()));

    let worker = DispatchWorker {
        queue: queue.clone(),
        selector: selector.clone(),
        client,
        store: payment_store.clone(),
        requeue_backoff: cfg.requeue_backoff,
    };
    let worker_handles = worker.spawn_pool(cfg.workers, cancel.clone());

    let state = AppState {
        payment_service: PaymentService {
            queue,
            store: payment_store,
            selector,
        },
    };

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    if let Err(e) = monitor_handle.await {
        tracing::error!(error = %e, "health monitor task failed");
    }
    for handle in worker_handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "dispatch worker task failed");
        }
    }
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancel.cancelled() => {},
    }

    tracing::info!("shutdown signal received");
    cancel.cancel();
}
