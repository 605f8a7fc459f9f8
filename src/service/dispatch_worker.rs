use crate::domain::payment::{Payment, ProcessorPaymentRequest};
use crate::error::{GatewayError, UpstreamError};
use crate::processors::ProcessorClient;
use crate::service::admission_queue::{AdmissionQueue, QueueFull};
use crate::service::provider_selector::ProviderSelector;
use crate::store::PaymentStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Completed,
    /// Provider rejected the payment; it is not retried.
    Dropped,
    Retry(Payment),
}

#[derive(Clone)]
pub struct DispatchWorker {
    pub queue: AdmissionQueue,
    pub selector: ProviderSelector,
    pub client: Arc<dyn ProcessorClient>,
    pub store: Arc<dyn PaymentStore>,
    pub requeue_backoff: Duration,
}

impl DispatchWorker {
    pub fn spawn_pool(&self, workers: usize, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        (0..workers)
            .map(|id| tokio::spawn(self.clone().run(id, cancel.clone())))
            .collect()
    }

    pub async fn run(self, id: usize, cancel: CancellationToken) {
        let mut pending: Option<Payment> = None;

        loop {
            let payment = match pending.take() {
                Some(p) if cancel.is_cancelled() => {
                    self.hand_back(id, p);
                    break;
                }
                Some(p) => p,
                None => match self.queue.dequeue(&cancel).await {
                    Some(p) => p,
                    None => break,
                },
            };

            if let Disposition::Retry(payment) = self.dispatch(payment).await {
                if !self.requeue_backoff.is_zero() {
                    tokio::time::sleep(self.requeue_backoff).await;
                }
                if let Err(QueueFull(payment)) = self.queue.try_enqueue(payment) {
                    tracing::warn!(
                        worker = id,
                        correlation_id = %payment.correlation_id,
                        "queue full on requeue, retrying in place"
                    );
                    pending = Some(payment);
                }
            }
        }

        tracing::debug!(worker = id, "dispatch worker stopped");
    }

    /// Returns a held payment to the queue when the worker stops. If the queue
    /// is still full the payment is logged with enough detail to reconcile it.
    pub fn hand_back(&self, worker: usize, payment: Payment) -> bool {
        match self.queue.try_enqueue(payment) {
            Ok(()) => {
                tracing::debug!(worker, "returned held payment to the queue on shutdown");
                true
            }
            Err(QueueFull(payment)) => {
                tracing::error!(
                    worker,
                    correlation_id = %payment.correlation_id,
                    amount = payment.amount,
                    attempts = payment.attempts,
                    processor = ?payment.processor,
                    "shutting down with undelivered payment"
                );
                false
            }
        }
    }

    /// One upstream attempt for `payment` against the currently selected provider.
    pub async fn dispatch(&self, mut payment: Payment) -> Disposition {
        let processor = self.selector.current_provider().await;
        let record = payment.stamp(processor, chrono::Utc::now());
        let request = ProcessorPaymentRequest::from(&record);

        match self.client.submit(processor, &request).await {
            Ok(()) => match self.store.record_payment(&record).await {
                Ok(()) => Disposition::Completed,
                Err(e) => {
                    let err = GatewayError::Persistence(format!("payment {}: {}", record.correlation_id, e));
                    tracing::error!(
                        error = %err,
                        processor = %processor,
                        attempts = payment.attempts,
                        "upstream accepted but record failed, requeueing"
                    );
                    Disposition::Retry(payment)
                }
            },
            Err(UpstreamError::Transient(message)) => {
                let flipped = self.selector.fail_over(processor);
                let err = UpstreamError::Transient(message).on(processor);
                tracing::warn!(
                    error = %err,
                    correlation_id = %payment.correlation_id,
                    attempts = payment.attempts,
                    flipped,
                    "requeueing payment"
                );
                Disposition::Retry(payment)
            }
            Err(rejected @ UpstreamError::Rejected(_)) => {
                let err = rejected.on(processor);
                tracing::warn!(error = %err, correlation_id = %payment.correlation_id, "dropping payment");
                Disposition::Dropped
            }
        }
    }
}
