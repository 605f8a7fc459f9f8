use crate::domain::provider::Processor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("admission queue is full")]
    QueueFull,
    #[error("invalid payment: {0}")]
    InvalidPayment(String),
    #[error("transient failure calling {processor} processor: {message}")]
    TransientUpstream { processor: Processor, message: String },
    #[error("{processor} processor rejected payment with HTTP {status}")]
    UpstreamRejection { processor: Processor, status: u16 },
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("health probe inconclusive: {0}")]
    HealthProbe(String),
    #[error("invalid configuration:\n{}", .0.join("\n"))]
    Config(Vec<String>),
}

/// Outcome of a single upstream submission that did not return 2xx.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network failure: {0}")]
    Transient(String),
    #[error("rejected with HTTP {0}")]
    Rejected(u16),
}

impl UpstreamError {
    pub fn on(self, processor: Processor) -> GatewayError {
        match self {
            UpstreamError::Transient(message) => GatewayError::TransientUpstream { processor, message },
            UpstreamError::Rejected(status) => GatewayError::UpstreamRejection { processor, status },
        }
    }
}
