use crate::domain::provider::Processor;
use crate::error::GatewayError;
use crate::processors::ProcessorClient;
use crate::service::provider_selector::ProviderSelector;
use crate::store::ProviderStateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Elected(Processor),
    /// Another instance holds the probe lock.
    Skipped,
}

#[derive(Clone)]
pub struct HealthMonitor {
    pub selector: ProviderSelector,
    pub store: Arc<dyn ProviderStateStore>,
    pub client: Arc<dyn ProcessorClient>,
    pub interval: Duration,
    pub lock_ttl: Duration,
}

impl HealthMonitor {
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("health monitor stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.run_cycle().await {
                Ok(CycleOutcome::Elected(processor)) => {
                    tracing::debug!(processor = %processor, "provider elected");
                }
                Ok(CycleOutcome::Skipped) => {
                    tracing::debug!("health probe lock held elsewhere, skipped cycle");
                }
                Err(e) => {
                    tracing::warn!(error = %e, elected = ?self.selector.cached(), "keeping previous provider");
                }
            }
        }
    }

    /// One probe cycle under the cross-instance lock. The lock is released on
    /// every path once it has been taken.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, GatewayError> {
        let token = Uuid::new_v4().to_string();
        let acquired = self
            .store
            .try_acquire_lock(&token, self.lock_ttl)
            .await
            .map_err(|e| GatewayError::HealthProbe(format!("lock unavailable: {}", e)))?;

        if !acquired {
            if let Err(e) = self.selector.refresh().await {
                tracing::warn!(error = %e, "failed to refresh elected provider");
            }
            return Ok(CycleOutcome::Skipped);
        }

        let outcome = self.probe_and_elect().await;

        if let Err(e) = self.store.release_lock(&token).await {
            tracing::warn!(error = %e, "failed to release health probe lock");
        }

        outcome.map(CycleOutcome::Elected)
    }

    async fn probe_and_elect(&self) -> Result<Processor, GatewayError> {
        for processor in Processor::ALL {
            match self.client.service_health(processor).await {
                Ok(status) if !status.failing => {
                    self.selector
                        .elect(processor)
                        .await
                        .map_err(|e| GatewayError::Persistence(format!("saving elected provider: {}", e)))?;
                    return Ok(processor);
                }
                Ok(status) => {
                    tracing::debug!(
                        processor = %processor,
                        min_response_time = status.min_response_time,
                        "processor reports failing"
                    );
                }
                Err(e) => {
                    tracing::warn!(processor = %processor, error = %e, "health probe did not complete");
                }
            }
        }

        Err(GatewayError::HealthProbe("no processor confirmed healthy".to_string()))
    }
}
