use crate::config::{AppConfig, ProcessorEndpoint};
use crate::domain::payment::ProcessorPaymentRequest;
use crate::domain::provider::Processor;
use crate::error::UpstreamError;
use crate::processors::{HealthStatus, ProcessorClient};
use anyhow::{Context, Result};
use std::time::Duration;

pub struct HttpProcessorClient {
    pub default_endpoint: ProcessorEndpoint,
    pub fallback_endpoint: ProcessorEndpoint,
    pub submit_timeout: Duration,
    pub health_timeout: Duration,
    pub client: reqwest::Client,
}

impl HttpProcessorClient {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(500))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(64)
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            default_endpoint: cfg.default_processor.clone(),
            fallback_endpoint: cfg.fallback_processor.clone(),
            submit_timeout: cfg.submit_timeout,
            health_timeout: cfg.health_timeout,
            client,
        })
    }

    fn endpoint(&self, processor: Processor) -> &ProcessorEndpoint {
        match processor {
            Processor::Default => &self.default_endpoint,
            Processor::Fallback => &self.fallback_endpoint,
        }
    }
}

#[async_trait::async_trait]
impl ProcessorClient for HttpProcessorClient {
    async fn submit(
        &self,
        processor: Processor,
        request: &ProcessorPaymentRequest,
    ) -> std::result::Result<(), UpstreamError> {
        let resp = self
            .client
            .post(&self.endpoint(processor).payments_url)
            .json(request)
            .timeout(self.submit_timeout)
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => Ok(()),
            Ok(r) => Err(UpstreamError::Rejected(r.status().as_u16())),
            Err(e) if e.is_timeout() => Err(UpstreamError::Transient("timed out".to_string())),
            Err(e) => Err(UpstreamError::Transient(e.to_string())),
        }
    }

    async fn service_health(&self, processor: Processor) -> Result<HealthStatus> {
        let url = &self.endpoint(processor).health_url;
        let status = self
            .client
            .get(url)
            .timeout(self.health_timeout)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()?
            .json::<HealthStatus>()
            .await?;
        Ok(status)
    }
}
