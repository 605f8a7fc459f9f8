use crate::domain::payment::PaymentRecord;
use crate::domain::provider::Processor;
use anyhow::Result;
use std::time::Duration;

pub mod store_memory;
pub mod store_redis;

/// Durable payment storage: a score-ordered timeline and an amount map per
/// processor, plus a per-id record for point lookups.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    /// Writes timeline entry, amount and record as one atomic unit. Any entry
    /// for the same correlation id under the other processor is removed.
    async fn record_payment(&self, record: &PaymentRecord) -> Result<()>;

    /// Ids whose score lies in `[min, max]`; `None` is an open bound.
    async fn range_by_score(&self, processor: Processor, min: Option<i64>, max: Option<i64>) -> Result<Vec<String>>;

    async fn batch_get_amounts(&self, processor: Processor, ids: &[String]) -> Result<Vec<Option<f64>>>;

    async fn get_by_correlation_id(&self, correlation_id: &str) -> Result<Option<PaymentRecord>>;

    /// Wipes every payment and all provider state.
    async fn reset(&self) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Elected-provider record and the health-probe lock shared across instances.
#[async_trait::async_trait]
pub trait ProviderStateStore: Send + Sync {
    async fn try_acquire_lock(&self, token: &str, ttl: Duration) -> Result<bool>;

    /// No-op unless the lock is still held by `token`.
    async fn release_lock(&self, token: &str) -> Result<()>;

    async fn save_elected(&self, processor: Processor) -> Result<()>;

    async fn load_elected(&self) -> Result<Option<Processor>>;
}
