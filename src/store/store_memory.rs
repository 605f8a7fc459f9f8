use crate::domain::payment::PaymentRecord;
use crate::domain::provider::Processor;
use crate::store::{PaymentStore, ProviderStateStore};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Default)]
struct Partition {
    scores: HashMap<String, i64>,
    amounts: HashMap<String, f64>,
}

#[derive(Default)]
struct MemoryState {
    partitions: HashMap<Processor, Partition>,
    records: HashMap<String, PaymentRecord>,
    elected: Option<Processor>,
    lock: Option<(String, Instant)>,
}

/// Single-process store with the same semantics as the Redis layout. Every
/// write takes one lock, which makes the multi-key updates atomic.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryStore {
    async fn record_payment(&self, record: &PaymentRecord) -> Result<()> {
        let mut state = self.state.write().await;
        let id = &record.correlation_id;

        if let Some(stale) = state.partitions.get_mut(&record.processor.other()) {
            stale.scores.remove(id);
            stale.amounts.remove(id);
        }

        let partition = state.partitions.entry(record.processor).or_default();
        partition.scores.insert(id.clone(), record.score());
        partition.amounts.insert(id.clone(), record.amount);
        state.records.insert(id.clone(), record.clone());
        Ok(())
    }

    async fn range_by_score(&self, processor: Processor, min: Option<i64>, max: Option<i64>) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let Some(partition) = state.partitions.get(&processor) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(i64, &String)> = partition
            .scores
            .iter()
            .filter(|(_, score)| min.map_or(true, |m| **score >= m) && max.map_or(true, |m| **score <= m))
            .map(|(id, score)| (*score, id))
            .collect();
        matched.sort();
        Ok(matched.into_iter().map(|(_, id)| id.clone()).collect())
    }

    async fn batch_get_amounts(&self, processor: Processor, ids: &[String]) -> Result<Vec<Option<f64>>> {
        let state = self.state.read().await;
        let partition = state.partitions.get(&processor);
        Ok(ids
            .iter()
            .map(|id| partition.and_then(|p| p.amounts.get(id).copied()))
            .collect())
    }

    async fn get_by_correlation_id(&self, correlation_id: &str) -> Result<Option<PaymentRecord>> {
        let state = self.state.read().await;
        Ok(state.records.get(correlation_id).cloned())
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        *state = MemoryState::default();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProviderStateStore for InMemoryStore {
    async fn try_acquire_lock(&self, token: &str, ttl: Duration) -> Result<bool> {
        let mut state = self.state.write().await;
        let now = Instant::now();
        if state.lock.as_ref().is_some_and(|(_, expires_at)| *expires_at > now) {
            return Ok(false);
        }
        state.lock = Some((token.to_string(), now + ttl));
        Ok(true)
    }

    async fn release_lock(&self, token: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if state.lock.as_ref().is_some_and(|(held, _)| held == token) {
            state.lock = None;
        }
        Ok(())
    }

    async fn save_elected(&self, processor: Processor) -> Result<()> {
        self.state.write().await.elected = Some(processor);
        Ok(())
    }

    async fn load_elected(&self) -> Result<Option<Processor>> {
        Ok(self.state.read().await.elected)
    }
}
