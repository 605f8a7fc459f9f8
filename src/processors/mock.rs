use crate::domain::payment::ProcessorPaymentRequest;
use crate::domain::provider::Processor;
use crate::error::UpstreamError;
use crate::processors::{HealthStatus, ProcessorClient};
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Accept,
    Reject(u16),
    Unreachable,
}

/// Scripted in-process stand-in for both payment processors.
///
/// `health` set to `None` makes the probe fail as if the host were down.
pub struct MockProcessor {
    behavior: Mutex<HashMap<Processor, MockBehavior>>,
    health: Mutex<HashMap<Processor, Option<HealthStatus>>>,
    submissions: Mutex<Vec<(Processor, ProcessorPaymentRequest)>>,
    probe_delay: Duration,
    probes_in_flight: AtomicUsize,
    max_probes_in_flight: AtomicUsize,
    probes_total: AtomicUsize,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    pub fn new() -> Self {
        let healthy = Some(HealthStatus {
            failing: false,
            min_response_time: 0,
        });
        Self {
            behavior: Mutex::new(Processor::ALL.iter().map(|p| (*p, MockBehavior::Accept)).collect()),
            health: Mutex::new(Processor::ALL.iter().map(|p| (*p, healthy)).collect()),
            submissions: Mutex::new(Vec::new()),
            probe_delay: Duration::ZERO,
            probes_in_flight: AtomicUsize::new(0),
            max_probes_in_flight: AtomicUsize::new(0),
            probes_total: AtomicUsize::new(0),
        }
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn set_behavior(&self, processor: Processor, behavior: MockBehavior) {
        self.behavior.lock().insert(processor, behavior);
    }

    pub fn set_health(&self, processor: Processor, health: Option<HealthStatus>) {
        self.health.lock().insert(processor, health);
    }

    pub fn set_failing(&self, processor: Processor, failing: bool) {
        self.set_health(
            processor,
            Some(HealthStatus {
                failing,
                min_response_time: 0,
            }),
        );
    }

    pub fn submissions(&self) -> Vec<(Processor, ProcessorPaymentRequest)> {
        self.submissions.lock().clone()
    }

    pub fn submissions_to(&self, processor: Processor) -> usize {
        self.submissions.lock().iter().filter(|(p, _)| *p == processor).count()
    }

    pub fn probes_total(&self) -> usize {
        self.probes_total.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_probes(&self) -> usize {
        self.max_probes_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProcessorClient for MockProcessor {
    async fn submit(
        &self,
        processor: Processor,
        request: &ProcessorPaymentRequest,
    ) -> std::result::Result<(), UpstreamError> {
        let behavior = self
            .behavior
            .lock()
            .get(&processor)
            .copied()
            .unwrap_or(MockBehavior::Accept);

        self.submissions.lock().push((processor, request.clone()));

        match behavior {
            MockBehavior::Accept => Ok(()),
            MockBehavior::Reject(status) => Err(UpstreamError::Rejected(status)),
            MockBehavior::Unreachable => Err(UpstreamError::Transient("connection refused".to_string())),
        }
    }

    async fn service_health(&self, processor: Processor) -> Result<HealthStatus> {
        let in_flight = self.probes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_probes_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.probes_total.fetch_add(1, Ordering::SeqCst);

        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }

        let health = self.health.lock().get(&processor).copied().flatten();
        self.probes_in_flight.fetch_sub(1, Ordering::SeqCst);

        health.ok_or_else(|| anyhow::anyhow!("{} processor unreachable", processor))
    }
}
