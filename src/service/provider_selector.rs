use crate::domain::provider::{Processor, ProviderState};
use crate::store::ProviderStateStore;
use anyhow::Result;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Cache-aside view of the elected provider.
///
/// The health monitor is the only regular writer; dispatch workers read it on
/// every attempt and may flip it after a transient failure. Reads are not
/// synchronised with the store, a stale value costs one failed attempt.
#[derive(Clone)]
pub struct ProviderSelector {
    cached: Arc<AtomicU8>,
    store: Arc<dyn ProviderStateStore>,
}

impl ProviderSelector {
    pub fn new(store: Arc<dyn ProviderStateStore>) -> Self {
        Self {
            cached: Arc::new(AtomicU8::new(ProviderState::Unknown.as_u8())),
            store,
        }
    }

    pub fn cached(&self) -> ProviderState {
        ProviderState::from_u8(self.cached.load(Ordering::Acquire))
    }

    fn set_cached(&self, state: ProviderState) {
        self.cached.store(state.as_u8(), Ordering::Release);
    }

    /// Cached value, else the durable record, else `Processor::Default`.
    pub async fn current_provider(&self) -> Processor {
        if let Some(processor) = self.cached().processor() {
            return processor;
        }

        match self.store.load_elected().await {
            Ok(Some(processor)) => {
                self.set_cached(processor.into());
                processor
            }
            Ok(None) => {
                tracing::debug!("no provider elected yet, using default");
                Processor::Default
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read elected provider, using default");
                Processor::Default
            }
        }
    }

    /// Persists the choice, then caches it. A failed save leaves the cache alone.
    pub async fn elect(&self, processor: Processor) -> Result<()> {
        self.store.save_elected(processor).await?;
        self.set_cached(processor.into());
        Ok(())
    }

    /// Switches the cache to the other provider if it still points at `failed`.
    /// Returns whether this call performed the switch.
    pub fn fail_over(&self, failed: Processor) -> bool {
        let from = ProviderState::from(failed).as_u8();
        let to = ProviderState::from(failed.other()).as_u8();
        let swapped = self
            .cached
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if swapped {
            return true;
        }
        // An empty cache means the failed attempt used the implicit default.
        self.cached
            .compare_exchange(ProviderState::Unknown.as_u8(), to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Pulls the durable record into the cache; leaves the cache untouched when
    /// nothing has been elected.
    pub async fn refresh(&self) -> Result<Option<Processor>> {
        let elected = self.store.load_elected().await?;
        if let Some(processor) = elected {
            self.set_cached(processor.into());
        }
        Ok(elected)
    }

    pub fn clear(&self) {
        self.set_cached(ProviderState::Unknown);
    }
}
