use crate::domain::payment::Payment;
use crate::error::GatewayError;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Rejected admission. Hands the payment back so a requeue never loses it.
#[derive(Debug, thiserror::Error)]
#[error("admission queue is full")]
pub struct QueueFull(pub Payment);

impl From<QueueFull> for GatewayError {
    fn from(_: QueueFull) -> Self {
        GatewayError::QueueFull
    }
}

/// Bounded FIFO shared by the HTTP handlers and every dispatch worker.
#[derive(Clone)]
pub struct AdmissionQueue {
    tx: mpsc::Sender<Payment>,
    rx: Arc<Mutex<mpsc::Receiver<Payment>>>,
    capacity: usize,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            capacity,
        }
    }

    pub fn try_enqueue(&self, payment: Payment) -> Result<(), QueueFull> {
        match self.tx.try_send(payment) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(p)) | Err(TrySendError::Closed(p)) => Err(QueueFull(p)),
        }
    }

    /// Waits for the next payment; `None` once `cancel` fires.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Option<Payment> {
        let mut rx = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            rx = self.rx.lock() => rx,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            payment = rx.recv() => payment,
        }
    }

    pub fn depth(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
