use crate::domain::payment::ProcessorPaymentRequest;
use crate::domain::provider::Processor;
use crate::error::UpstreamError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod mock;

/// Response of `GET {processor}/payments/service-health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub failing: bool,
    pub min_response_time: u64,
}

#[async_trait::async_trait]
pub trait ProcessorClient: Send + Sync {
    async fn submit(
        &self,
        processor: Processor,
        request: &ProcessorPaymentRequest,
    ) -> std::result::Result<(), UpstreamError>;

    async fn service_health(&self, processor: Processor) -> Result<HealthStatus>;
}
